/// Name of the config file `load_config` looks for next to the working directory.
pub const CONFIG_FILENAME: &str = "pgalign.yaml";
