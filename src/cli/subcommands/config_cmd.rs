// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::io::Write;

use crate::cli_shared::cli::Config;
use anyhow::Context as _;
use clap::Subcommand;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Dump the effective configuration as TOML
    Dump,
}

impl ConfigCommands {
    pub fn run<W: Write>(self, config: &Config, sink: &mut W) -> anyhow::Result<()> {
        match self {
            Self::Dump => writeln!(
                sink,
                "{}",
                toml::to_string(config).context("Could not convert configuration to TOML")?
            )
            .context("Failed to write the configuration"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dump_is_valid_toml() {
        let mut config = Config::default();
        config.store.compression_level = 19;
        let mut sink = vec![];
        ConfigCommands::Dump.run(&config, &mut sink).unwrap();
        let parsed: Config = toml::from_str(std::str::from_utf8(&sink).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
