//! Contributor annotation for partner, developer and community integrations.

use regex::Regex;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use crate::constants::{INTEGRATIONS_DIR, PACK_METADATA_FILE};
use crate::content::naming::capitalize;
use crate::utils::fs::read_json_file;

static CONTRIBUTED_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"### .* Contributed Integration").expect("valid pattern"));

const CONTRIBUTOR_SUPPORT_LEVELS: [&str; 3] = ["partner", "developer", "community"];
const COMMUNITY: &str = "community";
const COMMUNITY_DISCUSSIONS_URL: &str =
    "https://live.paloaltonetworks.com/t5/cortex-xsoar-discussions/bd-p/Cortex_XSOAR_Discussions";

/// Support details read from a pack's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contributor {
    pub support: String,
    pub author: String,
    pub emails: Vec<String>,
    pub url: String,
}

impl Contributor {
    /// Reads the contributor of a pack metadata document, if its support level is a contribution.
    #[must_use]
    pub fn from_metadata(metadata: &Value) -> Option<Self> {
        let support = metadata.get("support")?.as_str()?.to_string();
        if !CONTRIBUTOR_SUPPORT_LEVELS.contains(&support.as_str()) {
            return None;
        }
        let text = |key: &str| metadata.get(key).and_then(Value::as_str).unwrap_or_default().to_string();
        let emails = match metadata.get("email") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
            Some(Value::String(s)) => {
                s.split(',').map(str::trim).filter(|e| !e.is_empty()).map(str::to_string).collect()
            }
            _ => Vec::new(),
        };
        Some(Self {
            support,
            author: text("author"),
            emails,
            url: text("url"),
        })
    }

    /// The description block naming the contributor.
    #[must_use]
    pub fn description_block(&self) -> String {
        if self.support == COMMUNITY {
            return format!(
                "### Community Contributed Integration\n #### Integration Author: {}\n No support or maintenance is provided by the author. Customers are encouraged to engage with the user community for questions and guidance at the [Cortex XSOAR Live Discussions]({COMMUNITY_DISCUSSIONS_URL}).",
                self.author
            );
        }
        let mut block = format!(
            "### {} Contributed Integration\n#### Integration Author: {}\nSupport and maintenance for this integration are provided by the author. Please use the following contact details:",
            capitalize(&self.support),
            self.author
        );
        for email in &self.emails {
            block.push_str(&format!("\n- **Email**: [{email}](mailto:{email})"));
        }
        if !self.url.is_empty() {
            block.push_str(&format!("\n- **URL**: [{0}]({0})", self.url));
        }
        block
    }

    /// Appends the contribution suffix to `display` and prepends the description block.
    pub fn annotate(&self, doc: &mut Map<String, Value>) {
        if let Some(Value::String(display)) = doc.get_mut("display")
            && !display.contains(" Contribution)")
        {
            display.push_str(&format!(" ({} Contribution)", capitalize(&self.support)));
        }

        let existing = doc.get("detaileddescription").and_then(Value::as_str).unwrap_or_default().to_string();
        if !CONTRIBUTED_HEADER.is_match(&existing) {
            doc.insert(
                "detaileddescription".to_string(),
                Value::String(format!("{}\n***\n{existing}", self.description_block())),
            );
        }
    }
}

/// Finds the pack that owns `package_dir`.
///
/// The pack is the prefix of the path before an `Integrations` component, or failing
/// that the nearest ancestor holding a `pack_metadata.json`.
#[must_use]
pub fn find_pack_dir(package_dir: &Path) -> Option<PathBuf> {
    let components: Vec<_> = package_dir.components().collect();
    if let Some(idx) = components.iter().position(|c| c.as_os_str() == INTEGRATIONS_DIR) {
        let pack: PathBuf = components[..idx].iter().collect();
        if pack.join(PACK_METADATA_FILE).is_file() {
            return Some(pack);
        }
    }
    package_dir.ancestors().find(|dir| dir.join(PACK_METADATA_FILE).is_file()).map(Path::to_path_buf)
}

/// Reads the contributor of the pack owning `package_dir`, if any.
#[must_use]
pub fn find_contributor(package_dir: &Path) -> Option<Contributor> {
    let pack = find_pack_dir(package_dir)?;
    match read_json_file::<Value>(&pack.join(PACK_METADATA_FILE)) {
        Ok(metadata) => Contributor::from_metadata(&metadata),
        Err(e) => {
            tracing::warn!(target: "unify", "Ignoring unreadable pack metadata: {e:#}");
            None
        }
    }
}
