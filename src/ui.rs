// UI layer: interactive guild picker using `dialoguer`. The menu
// lists the caller's guilds alphabetically plus entries for dumping
// every guild at once and quitting.

use crate::api::ApiClient;
use crate::archive::dump_guild;
use anyhow::Result;
use dialoguer::Select;
use std::path::Path;
use tracing::{info, warn};

/// Main interactive loop. Blocks until the user quits. A 401 on the
/// initial guild listing propagates out before any menu is shown.
pub fn main_menu(api: &ApiClient, out_dir: &Path, json_mode: bool) -> Result<()> {
    let mut guilds = api.list_guilds()?;
    guilds.sort_by(|a, b| a.name.cmp(&b.name));

    if guilds.is_empty() {
        info!("no guilds available for this token");
        return Ok(());
    }

    loop {
        let mut items: Vec<String> = guilds.iter().map(|g| g.name.clone()).collect();
        items.push("Dump emotes from every guild".into());
        items.push("Quit".into());

        let selection = Select::new()
            .with_prompt("Guild")
            .items(&items)
            .default(0)
            .interact()?;

        if selection < guilds.len() {
            dump_guild(api, &guilds[selection].id, out_dir, json_mode)?;
        } else if selection == guilds.len() {
            info!("dumping from every guild, this may take a while");
            for guild in &guilds {
                // keep going past a broken guild; the rest still dump
                if let Err(err) = dump_guild(api, &guild.id, out_dir, json_mode) {
                    warn!(guild = %guild.name, %err, "dump failed, continuing");
                }
            }
        } else {
            println!("Goodbye! (^_^)/");
            break;
        }
    }
    Ok(())
}
