//! Inventory groups and host variables from controller records

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::model::{Device, Site, TopologyNode};
use super::naming::{normalize_site_name, sanitize_group_name, RESERVED_GROUPS};
use super::options::InventoryOptions;
use super::InventoryError;

/// Group for hosts whose site is unknown
pub const UNGROUPED: &str = "ungrouped";

/// An inventory group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Group {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub hosts: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub children: BTreeSet<String>,
}

/// Built inventory
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    groups: BTreeMap<String, Group>,
    hostvars: BTreeMap<String, Map<String, Value>>,
}

impl Inventory {
    pub fn groups(&self) -> &BTreeMap<String, Group> {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hostvars.keys().map(String::as_str)
    }

    pub fn host_count(&self) -> usize {
        self.hostvars.len()
    }

    pub fn hostvars(&self, host: &str) -> Option<&Map<String, Value>> {
        self.hostvars.get(host)
    }

    pub fn host_var(&self, host: &str, key: &str) -> Option<&Value> {
        self.hostvars.get(host).and_then(|vars| vars.get(key))
    }

    /// Groups that are nobody's child
    pub fn top_level_groups(&self) -> BTreeSet<&str> {
        let nested: BTreeSet<&str> = self
            .groups
            .values()
            .flat_map(|g| g.children.iter().map(String::as_str))
            .collect();
        self.groups
            .keys()
            .map(String::as_str)
            .filter(|name| !nested.contains(name))
            .collect()
    }

    /// Dynamic inventory JSON (`_meta.hostvars`, `all.children`, groups)
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "_meta".to_string(),
            json!({ "hostvars": self.hostvars }),
        );
        root.insert(
            "all".to_string(),
            json!({ "children": self.top_level_groups() }),
        );
        for (name, group) in &self.groups {
            root.insert(name.clone(), json!(group));
        }
        Value::Object(root)
    }

    fn group_mut(&mut self, name: &str) -> &mut Group {
        self.groups.entry(name.to_string()).or_default()
    }
}

/// A `keyed_groups` entry: one group per value of a host variable
///
/// `key` names a host variable, with `.` descending into objects
/// (`host_data.platformId`). A string value yields one group, a list one
/// group per element, and a mapping one `name<separator>value` group per
/// entry. Group names are `prefix + separator + value`; with an empty
/// prefix the separator is kept unless `leading_separator` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedGroup {
    pub key: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_leading_separator")]
    pub leading_separator: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<String>,
}

fn default_separator() -> String {
    "_".to_string()
}

fn default_leading_separator() -> bool {
    true
}

impl KeyedGroup {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prefix: String::new(),
            separator: default_separator(),
            leading_separator: default_leading_separator(),
            parent_group: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_parent_group(mut self, parent: impl Into<String>) -> Self {
        self.parent_group = Some(parent.into());
        self
    }

    /// Group name for one raw value
    pub fn group_name(&self, raw: &str) -> String {
        let separator = if self.prefix.is_empty() && !self.leading_separator {
            ""
        } else {
            self.separator.as_str()
        };
        sanitize_group_name(&format!("{}{}{}", self.prefix, separator, raw))
    }

    /// Group names for the value of the key; empty values yield none
    fn group_names(&self, value: &Value) -> Vec<String> {
        let raw: Vec<String> = match value {
            Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
            Value::Object(entries) => entries
                .iter()
                .filter_map(|(name, value)| {
                    scalar_text(value).map(|value| format!("{}{}{}", name, self.separator, value))
                })
                .collect(),
            other => scalar_text(other).into_iter().collect(),
        };
        raw.iter()
            .filter(|raw| !raw.is_empty())
            .map(|raw| self.group_name(raw))
            .collect()
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Host variable at a dotted path
fn lookup_path<'v>(vars: &'v Map<String, Value>, key: &str) -> Option<&'v Value> {
    let mut parts = key.split('.');
    let first = vars.get(parts.next()?)?;
    parts.try_fold(first, |value, part| value.get(part))
}

fn ensure_not_reserved(name: &str) -> Result<(), InventoryError> {
    if RESERVED_GROUPS.contains(&name) {
        return Err(InventoryError::ReservedGroupName(name.to_string()));
    }
    Ok(())
}

struct SiteGroup {
    id: String,
    name: String,
    parent_id: Option<String>,
}

/// Builds an [`Inventory`] from device, site and topology records
#[derive(Debug, Clone)]
pub struct InventoryBuilder {
    use_dnac_mgmt_int: bool,
    toplevel: Option<String>,
    keyed_groups: Vec<KeyedGroup>,
    strict: bool,
    sites: Vec<Site>,
    topology: Vec<TopologyNode>,
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryBuilder {
    pub fn new() -> Self {
        Self {
            use_dnac_mgmt_int: true,
            toplevel: None,
            keyed_groups: Vec::new(),
            strict: false,
            sites: Vec::new(),
            topology: Vec::new(),
        }
    }

    /// Builder configured from resolved source options
    pub fn from_options(options: &InventoryOptions) -> Self {
        Self {
            use_dnac_mgmt_int: options.use_dnac_mgmt_int,
            toplevel: options.toplevel.clone(),
            keyed_groups: options.keyed_groups.clone(),
            strict: options.strict,
            ..Self::new()
        }
    }

    pub fn with_management_interface(mut self, enabled: bool) -> Self {
        self.use_dnac_mgmt_int = enabled;
        self
    }

    pub fn with_toplevel(mut self, name: impl Into<String>) -> Self {
        self.toplevel = Some(name.into());
        self
    }

    pub fn with_keyed_group(mut self, keyed: KeyedGroup) -> Self {
        self.keyed_groups.push(keyed);
        self
    }

    /// Fail instead of skipping a host that has no value for a keyed group
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_sites(mut self, sites: Vec<Site>) -> Self {
        self.sites = sites;
        self
    }

    pub fn with_topology(mut self, topology: Vec<TopologyNode>) -> Self {
        self.topology = topology;
        self
    }

    fn site_groups(&self) -> Vec<SiteGroup> {
        self.sites
            .iter()
            .map(|site| SiteGroup {
                id: site.id.clone(),
                name: normalize_site_name(&site.name, site.location_type.as_deref()),
                parent_id: site.parent_id.clone(),
            })
            .collect()
    }

    /// Every site must map to its own, unreserved group name
    fn check_site_names(&self, sites: &[SiteGroup]) -> Result<(), InventoryError> {
        let mut owners: BTreeMap<&str, String> = BTreeMap::new();
        if let Some(toplevel) = &self.toplevel {
            ensure_not_reserved(toplevel)?;
            owners.insert(toplevel, "toplevel".to_string());
        }
        for site in sites {
            ensure_not_reserved(&site.name)?;
            let owner = format!("site '{}'", site.id);
            if let Some(first) = owners.get(site.name.as_str()) {
                if *first != owner {
                    return Err(InventoryError::GroupNameCollision {
                        name: site.name.clone(),
                        first: first.clone(),
                        second: owner,
                    });
                }
            }
            owners.insert(&site.name, owner);
        }
        Ok(())
    }

    fn add_sites(&self, inventory: &mut Inventory, sites: &[SiteGroup]) -> Result<(), InventoryError> {
        self.check_site_names(sites)?;
        if let Some(toplevel) = &self.toplevel {
            inventory.group_mut(toplevel);
        }
        for site in sites {
            inventory.group_mut(&site.name);
        }
        for site in sites {
            let parent = site
                .parent_id
                .as_deref()
                .filter(|parent_id| *parent_id != site.id)
                .and_then(|parent_id| sites.iter().find(|s| s.id == parent_id));
            match (parent, &self.toplevel) {
                (Some(parent), _) => {
                    inventory
                        .group_mut(&parent.name)
                        .children
                        .insert(site.name.clone());
                }
                (None, Some(toplevel)) => {
                    inventory
                        .group_mut(toplevel)
                        .children
                        .insert(site.name.clone());
                }
                (None, None) => {}
            }
        }
        Ok(())
    }

    fn add_keyed_groups(
        &self,
        inventory: &mut Inventory,
        host: &str,
        vars: &Map<String, Value>,
    ) -> Result<(), InventoryError> {
        for keyed in &self.keyed_groups {
            let names = lookup_path(vars, &keyed.key)
                .map(|value| keyed.group_names(value))
                .unwrap_or_default();
            if names.is_empty() {
                if self.strict {
                    return Err(InventoryError::KeyedGroupMissing {
                        host: host.to_string(),
                        key: keyed.key.clone(),
                    });
                }
                debug!(host, key = %keyed.key, "no value for keyed group");
                continue;
            }

            for name in names {
                ensure_not_reserved(&name)?;
                inventory.group_mut(&name).hosts.insert(host.to_string());
                if let Some(parent) = &keyed.parent_group {
                    ensure_not_reserved(parent)?;
                    if *parent != name {
                        inventory.group_mut(parent).children.insert(name);
                    }
                }
            }
        }
        Ok(())
    }

    fn member_site<'s>(
        &self,
        device: &Device,
        sites: &'s [SiteGroup],
    ) -> Result<&'s str, InventoryError> {
        let node = self
            .topology
            .iter()
            .find(|node| node.id == device.id)
            .ok_or_else(|| InventoryError::TopologyMissing(device.id.clone()))?;

        let Some(site_id) = node.site_id() else {
            return Ok(UNGROUPED);
        };
        let matches: Vec<&SiteGroup> = sites.iter().filter(|s| s.id == site_id).collect();
        match matches.as_slice() {
            [] => Ok(UNGROUPED),
            [site] => Ok(site.name.as_str()),
            _ => Err(InventoryError::AmbiguousSite {
                device: device.id.clone(),
                site_id: site_id.to_string(),
                count: matches.len(),
            }),
        }
    }

    fn host_variables(&self, device: &Device, site: &str) -> Map<String, Value> {
        let mut vars = Map::new();
        if self.use_dnac_mgmt_int {
            if let Some(ip) = &device.management_ip_address {
                vars.insert("ansible_host".to_string(), json!(ip));
            }
        }
        vars.insert("os".to_string(), json!(device.software_type));
        vars.insert("version".to_string(), json!(device.software_version));
        vars.insert(
            "reachability_status".to_string(),
            json!(device.reachability_status),
        );
        vars.insert("serial_number".to_string(), json!(device.serial_numbers()));
        vars.insert("hw_type".to_string(), json!(device.series));
        vars.insert("role".to_string(), json!(device.role));
        vars.insert("id".to_string(), json!(device.id));
        vars.insert("site".to_string(), json!(site));
        vars.insert("host_data".to_string(), device.raw.clone());

        let network_os = device
            .software_type
            .as_deref()
            .and_then(|os| network_os(&os.to_lowercase()));
        if let Some(network_os) = network_os {
            vars.insert("ansible_network_os".to_string(), json!(network_os));
            vars.insert("ansible_connection".to_string(), json!("network_cli"));
            vars.insert("ansible_become".to_string(), json!("yes"));
            vars.insert("ansible_become_method".to_string(), json!("enable"));
        }
        vars
    }

    /// Build the inventory; access points are skipped
    pub fn build(&self, devices: &[Device]) -> Result<Inventory, InventoryError> {
        let sites = self.site_groups();
        let mut inventory = Inventory::default();
        self.add_sites(&mut inventory, &sites)?;

        let mut skipped = 0usize;
        for device in devices {
            if device.is_access_point() {
                skipped += 1;
                continue;
            }
            let site = self.member_site(device, &sites)?;
            let host = device.inventory_name().to_string();
            debug!(host = %host, site, "adding host");

            inventory.group_mut(site).hosts.insert(host.clone());
            let vars = self.host_variables(device, site);
            self.add_keyed_groups(&mut inventory, &host, &vars)?;
            inventory.hostvars.insert(host, vars);
        }

        info!(
            hosts = inventory.host_count(),
            groups = inventory.groups.len(),
            skipped_access_points = skipped,
            "inventory built"
        );
        Ok(inventory)
    }
}

/// `ansible_network_os` for a lowercased software type
fn network_os(software_type: &str) -> Option<&'static str> {
    match software_type {
        "ios" | "ios-xe" | "unified ap" => Some("ios"),
        "nxos" | "nx-os" => Some("nxos"),
        _ => None,
    }
}
