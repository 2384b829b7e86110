//! Sample content for tests
//!
//! A small but realistic repository: a `HelloWorld` pack with an integration
//! package importing an API module, a script package, a playbook, an indicator
//! type and an incident field, plus an `xpanse`-only pack.

use anyhow::Result;
use serde_json::{Value, json};

use super::builder::{ContentRepo, ContentRepoBuilder};

/// The PNG signature, enough for the image to be inlined.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

pub const HELLO_WORLD_YML: &str = r"commonfields:
  id: HelloWorld
  version: -1
name: HelloWorld
display: Hello World
category: Utilities
description: Sample integration.
configuration:
- name: url
  display: Server URL
  type: 0
  required: true
- name: isFetch
  display: Fetch incidents
  type: 8
  hidden:
  - marketplacev2
script:
  type: python
  subtype: python3
  dockerimage: demisto/python3:3.10.13.1
  script: ''
  isfetch: true
  commands:
  - name: helloworld-say-hello
    arguments:
    - name: name
  - name: ip
fromversion: 6.0.0
tests:
- HelloWorld-Test
";

pub const HELLO_WORLD_PY: &str = "import demistomock as demisto  # noqa: F401\n\
from CommonServerPython import *  # noqa: F401\n\
\n\
from HTTPApiModule import *  # noqa: E402\n\
\n\
\n\
def say_hello(name):\n    return f'Hello {name}'\n";

pub const HELLO_WORLD_DESCRIPTION: &str = "Configure the server URL to say hello.\n";

pub const HTTP_API_MODULE_PY: &str = "class BaseHTTPClient:\n    pass\n";

pub const ECHO_YML: &str = r"commonfields:
  id: Echo
  version: -1
name: Echo
comment: Echoes its input.
type: python
subtype: python3
script: '-'
tags:
- utility
dependson:
  must:
  - HelloWorld|||helloworld-say-hello
fromversion: 5.0.0
";

pub const ECHO_PY: &str = "import demistomock as demisto  # noqa: F401\n\
from CommonServerPython import *  # noqa: F401\n\
\n\
\n\
def main():\n    return_results(demisto.args().get('value'))\n";

pub const PLAYBOOK_YML: &str = r"id: Say Hello
name: Say Hello
starttaskid: '0'
tasks:
  '0':
    id: '0'
    type: start
    task:
      name: start
    nexttasks:
      '#none#':
      - '1'
  '1':
    id: '1'
    type: regular
    task:
      name: echo
      scriptName: Echo
    scriptarguments:
      value:
        simple: ${incident.hello_score}
    nexttasks:
      '#none#':
      - '2'
  '2':
    id: '2'
    type: regular
    skipunavailable: true
    task:
      name: greet
      script: HelloWorld|||helloworld-say-hello
fromversion: 6.0.0
";

#[must_use]
pub fn pack_metadata(name: &str, support: &str, marketplaces: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("The {name} pack"),
        "support": support,
        "currentVersion": "1.2.0",
        "author": "Cortex XSOAR",
        "url": "https://www.paloaltonetworks.com/cortex",
        "email": "",
        "categories": ["Utilities"],
        "tags": [],
        "useCases": [],
        "keywords": [],
        "marketplaces": marketplaces,
    })
}

/// A builder pre-loaded with the sample repository.
pub fn sample_repo_builder() -> Result<ContentRepoBuilder> {
    let builder = ContentRepoBuilder::new()?
        .with_pack("HelloWorld", &pack_metadata("HelloWorld", "xsoar", &["xsoar", "marketplacev2"]))?
        .with_file("Packs/HelloWorld/Integrations/HelloWorld/HelloWorld.yml", HELLO_WORLD_YML)
        .with_file("Packs/HelloWorld/Integrations/HelloWorld/HelloWorld.py", HELLO_WORLD_PY)
        .with_file("Packs/HelloWorld/Integrations/HelloWorld/HelloWorld_test.py", "def test_say_hello():\n    pass\n")
        .with_file(
            "Packs/HelloWorld/Integrations/HelloWorld/HelloWorld_description.md",
            HELLO_WORLD_DESCRIPTION,
        )
        .with_bytes("Packs/HelloWorld/Integrations/HelloWorld/HelloWorld_image.png", PNG_BYTES)
        .with_file("Packs/HelloWorld/Integrations/HelloWorld/README.md", "# Hello World\n")
        .with_file("Packs/HelloWorld/Scripts/Echo/Echo.yml", ECHO_YML)
        .with_file("Packs/HelloWorld/Scripts/Echo/Echo.py", ECHO_PY)
        .with_file("Packs/HelloWorld/Playbooks/playbook-Say_Hello.yml", PLAYBOOK_YML)
        .with_file(
            "Packs/HelloWorld/IndicatorTypes/reputation-ip.json",
            json!({"id": "IP", "details": "IP", "regex": "\\d+", "reputationCommand": "ip"}).to_string(),
        )
        .with_file(
            "Packs/HelloWorld/IncidentFields/incidentfield-Hello_Score.json",
            json!({"id": "incident_helloscore", "name": "Hello Score", "cliName": "helloscore"}).to_string(),
        )
        .with_pack("ApiModules", &pack_metadata("ApiModules", "xsoar", &[]))?
        .with_file(
            "Packs/ApiModules/Scripts/HTTPApiModule/HTTPApiModule.yml",
            "commonfields:\n  id: HTTPApiModule\nname: HTTPApiModule\ntype: python\nscript: '-'\n",
        )
        .with_file("Packs/ApiModules/Scripts/HTTPApiModule/HTTPApiModule.py", HTTP_API_MODULE_PY)
        .with_pack("Expanse", &pack_metadata("Expanse", "xsoar", &["xpanse"]))?
        .with_file(
            "Packs/Expanse/Scripts/script-ExpanseOnly.yml",
            "commonfields:\n  id: ExpanseOnly\nname: ExpanseOnly\ntype: python\nscript: print(1)\n",
        );
    Ok(builder)
}

/// The sample repository.
pub fn sample_repo() -> Result<ContentRepo> {
    sample_repo_builder()?.build()
}
