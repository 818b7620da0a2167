//! `dna_center` inventory source
//!
//! The consumer of the injected `DNAC_*` variables: option resolution for
//! `dna_center.yml`, and the offline half of inventory construction
//! (paging, site groups, host variables) from controller records that were
//! already fetched.

mod builder;
mod env;
mod model;
mod naming;
mod options;
mod pagination;

use thiserror::Error;

pub use builder::{Group, Inventory, InventoryBuilder, KeyedGroup, UNGROUPED};
pub use env::{EnvLookup, ProcessEnv};
pub use model::{
    devices_from_value, sites_from_value, topology_from_value, Device, Site, TopologyNode,
};
pub use naming::{normalize_site_name, sanitize_group_name, RESERVED_GROUPS};
pub use options::{
    verify_file, InventoryOptions, InventoryOptionsSummary, RawInventoryOptions,
    DEFAULT_DEVICE_FAMILIES, FILE_SUFFIX, PLUGIN_NAME,
};
pub use pagination::{page_plan, DeviceListQuery, PageRequest, DEFAULT_RECORD_LIMIT};

/// Inventory source errors
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("'{0}' is not a dna_center inventory source (file name must end with dna_center.yml)")]
    UnsupportedFile(String),

    #[error("plugin '{0}' is not dna_center")]
    WrongPlugin(String),

    #[error("missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("option '{option}' is not set and {variable} is not in the environment")]
    MissingCredential {
        option: &'static str,
        variable: &'static str,
    },

    #[error("api_record_limit must be greater than zero")]
    InvalidRecordLimit,

    #[error("device '{0}' is not present in the physical topology")]
    TopologyMissing(String),

    #[error("device '{device}' matches {count} sites with id '{site_id}'")]
    AmbiguousSite {
        device: String,
        site_id: String,
        count: usize,
    },

    #[error("option '{0}' is not supported; only keyed_groups can be used to construct groups")]
    UnsupportedOption(&'static str),

    #[error("group name '{0}' is reserved by the inventory format")]
    ReservedGroupName(String),

    #[error("{first} and {second} both map to group '{name}'")]
    GroupNameCollision {
        name: String,
        first: String,
        second: String,
    },

    #[error("host '{host}' has no value for keyed group key '{key}' (strict)")]
    KeyedGroupMissing { host: String, key: String },

    #[error("invalid {what}: {message}")]
    Parse { what: &'static str, message: String },
}
