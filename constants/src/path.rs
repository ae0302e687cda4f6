/// Placement config asset, relative to the asset root.
pub const PLACEMENT_CONFIG_PATH: &str = "placement_config.json";
