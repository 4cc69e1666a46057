/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

use anyhow::{Context, Result};
use colored::Colorize;

use jobq::{ConfigKey, ConfigStore};

pub fn set(config: &ConfigStore, key: ConfigKey, value: u32) -> Result<()> {
    config
        .set(key, value)
        .context("Failed to update configuration")?;
    println!(
        "{} Config updated: {} = {}",
        "✓".green().bold(),
        key.as_str(),
        value
    );
    Ok(())
}

pub fn show(config: &ConfigStore) -> Result<()> {
    let current = config.load().context("Failed to read configuration")?;
    println!("{}", serde_json::to_string_pretty(&current)?);
    Ok(())
}
