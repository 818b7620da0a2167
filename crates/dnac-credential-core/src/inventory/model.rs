//! Controller records consumed by the inventory builder
//!
//! Snapshots may be the raw API body (`{"response": ...}`) or the bare
//! payload. Unknown fields are ignored; the full device record is kept so it
//! can be exposed as `host_data`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::InventoryError;

/// Network device record from the device list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub management_ip_address: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub software_type: Option<String>,
    #[serde(default)]
    pub software_version: Option<String>,
    #[serde(default)]
    pub reachability_status: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(skip)]
    pub raw: Value,
}

impl Device {
    /// Access points are managed through their controller, not inventoried
    pub fn is_access_point(&self) -> bool {
        self.family
            .as_deref()
            .map(|f| f.contains("Unified AP"))
            .unwrap_or(false)
    }

    /// Inventory host name: hostname, else management IP, else device id
    pub fn inventory_name(&self) -> &str {
        [&self.hostname, &self.management_ip_address]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
            .unwrap_or(self.id.as_str())
    }

    /// Serial numbers; stacked devices report a comma separated list
    pub fn serial_numbers(&self) -> Vec<String> {
        match self.serial_number.as_deref() {
            Some(serials) if !serials.is_empty() => {
                serials.split(", ").map(str::to_string).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Site record from the site topology endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub location_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub siteid: Option<String>,
}

/// Node of the physical topology
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyNode {
    pub id: String,
    #[serde(default)]
    pub additional_info: Option<NodeInfo>,
}

impl TopologyNode {
    pub fn site_id(&self) -> Option<&str> {
        self.additional_info
            .as_ref()
            .and_then(|info| info.siteid.as_deref())
    }
}

/// Strip the `response` wrapper and, if present, the named list key
fn payload(value: Value, list_key: &str) -> Value {
    let value = match value {
        Value::Object(mut map) if map.contains_key("response") => {
            map.remove("response").unwrap_or(Value::Null)
        }
        other => other,
    };
    match value {
        Value::Object(mut map) if map.contains_key(list_key) => {
            map.remove(list_key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn list<T: DeserializeOwned>(
    value: Value,
    list_key: &str,
    what: &'static str,
) -> Result<Vec<T>, InventoryError> {
    serde_json::from_value(payload(value, list_key)).map_err(|e| InventoryError::Parse {
        what,
        message: e.to_string(),
    })
}

/// Devices from a device list snapshot
pub fn devices_from_value(value: Value) -> Result<Vec<Device>, InventoryError> {
    let records = match payload(value, "devices") {
        Value::Array(records) => records,
        other => {
            return Err(InventoryError::Parse {
                what: "device list",
                message: format!("expected an array, found {}", kind(&other)),
            })
        }
    };
    records
        .into_iter()
        .map(|record| {
            let mut device: Device =
                serde_json::from_value(record.clone()).map_err(|e| InventoryError::Parse {
                    what: "device record",
                    message: e.to_string(),
                })?;
            device.raw = record;
            Ok(device)
        })
        .collect()
}

/// Sites from a site topology snapshot
pub fn sites_from_value(value: Value) -> Result<Vec<Site>, InventoryError> {
    list(value, "sites", "site topology")
}

/// Nodes from a physical topology snapshot
pub fn topology_from_value(value: Value) -> Result<Vec<TopologyNode>, InventoryError> {
    list(value, "nodes", "physical topology")
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_devices_with_response_wrapper() {
        let devices = devices_from_value(json!({
            "response": [
                {
                    "id": "dev-1",
                    "hostname": "core-sw1",
                    "managementIpAddress": "10.1.1.1",
                    "family": "Switches and Hubs",
                    "softwareType": "IOS-XE",
                    "serialNumber": "FOC1, FOC2",
                    "platformId": "C9300-48P"
                }
            ]
        }))
        .unwrap();
        assert_eq!(devices.len(), 1);
        let device = &devices[0];
        assert_eq!(device.inventory_name(), "core-sw1");
        assert_eq!(device.serial_numbers(), vec!["FOC1", "FOC2"]);
        assert_eq!(device.raw["platformId"], "C9300-48P");
        assert!(!device.is_access_point());
    }

    #[test]
    fn test_bare_device_array() {
        let devices = devices_from_value(json!([{ "id": "dev-2", "family": "Unified AP" }])).unwrap();
        assert!(devices[0].is_access_point());
        assert_eq!(devices[0].inventory_name(), "dev-2");
    }

    #[test]
    fn test_inventory_name_falls_back_to_ip() {
        let device = Device {
            id: "dev-3".to_string(),
            hostname: Some(String::new()),
            management_ip_address: Some("10.9.9.9".to_string()),
            ..Default::default()
        };
        assert_eq!(device.inventory_name(), "10.9.9.9");
    }

    #[test]
    fn test_device_list_must_be_array() {
        let err = devices_from_value(json!({ "response": { "id": "x" } })).unwrap_err();
        assert!(err.to_string().contains("an object"));
    }

    #[test]
    fn test_sites_and_topology() {
        let sites = sites_from_value(json!({
            "response": { "sites": [
                { "id": "s1", "name": "Global", "parentId": null, "locationType": "area" }
            ]}
        }))
        .unwrap();
        assert_eq!(sites[0].name, "Global");

        let nodes = topology_from_value(json!({
            "response": { "nodes": [
                { "id": "dev-1", "additionalInfo": { "siteid": "s1" } },
                { "id": "cloud-node" }
            ]}
        }))
        .unwrap();
        assert_eq!(nodes[0].site_id(), Some("s1"));
        assert_eq!(nodes[1].site_id(), None);
    }

    #[test]
    fn test_record_missing_id_rejected() {
        assert!(sites_from_value(json!([{ "name": "no id" }])).is_err());
    }
}
