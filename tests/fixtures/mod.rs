//! Documents used by the integration tests
//!
//! Repository layouts come from `packsmith_cli::test_utils::fixtures`; this
//! module holds standalone unified documents and id-set files.

#![allow(dead_code)]

use serde_json::{Value, json};

/// A unified PowerShell script without `fromversion`.
pub const UNIFIED_POWERSHELL_SCRIPT: &str = r"commonfields:
  id: Greet
  version: -1
name: Greet
comment: Says hello.
type: powershell
script: |-
  Write-Output 'hello'
tags: []
";

/// A unified parsing rule.
pub const UNIFIED_PARSING_RULE: &str = r#"id: Acme_ParsingRule
name: Acme Parsing Rule
fromversion: 6.8.0
tags: []
rules: |-
  [INGEST:vendor=acme, product=fw, target_dataset=acme_fw_raw]
  alter _time = now();
samples: '{"acme_fw_raw": []}'
"#;

/// One `{id: record}` entry of an id-set bucket.
pub fn entry(id: &str, pack: &str, fromversion: &str) -> Value {
    json!({ id: {
        "name": id,
        "file_path": format!("Packs/{pack}/Scripts/script-{id}.yml"),
        "pack": pack,
        "fromversion": fromversion,
        "source": ["github.com", "demisto", "content"],
    }})
}

/// An id-set holding `scripts` and a matching `Packs` table.
pub fn id_set_with_scripts(scripts: &[(&str, &str, &str)]) -> Value {
    let entries: Vec<Value> = scripts.iter().map(|(id, pack, from)| entry(id, pack, from)).collect();
    let mut packs = serde_json::Map::new();
    for (_, pack, _) in scripts {
        packs.insert((*pack).to_string(), json!({"name": pack, "current_version": "1.0.0"}));
    }
    json!({
        "scripts": entries,
        "playbooks": [],
        "integrations": [],
        "Packs": packs,
    })
}
