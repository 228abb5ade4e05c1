//! `gantry exports` command

use anyhow::Result;

use gantry::core::module_id::ModuleId;
use gantry::ops::resolve_project;
use gantry::util::GlobalContext;

use crate::cli::ExportsArgs;
use crate::commands::{diagnose_resolve, load_project, target_context};

pub fn execute(args: ExportsArgs, color: bool) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let project = load_project(&ctx)?;
    let target = target_context(&args.target);

    let resolved =
        resolve_project(&project, &target).map_err(|e| diagnose_resolve(e, color))?;

    let id = ModuleId::new(args.module.as_str());
    let exports = resolved.visibility.exports(id).ok_or_else(|| {
        anyhow::anyhow!(
            "module `{}` not found\nhelp: Run `gantry tree` to see all discovered modules",
            args.module
        )
    })?;

    println!("exports of `{}`:", id);
    for member in exports {
        println!("  {}", member);
    }

    if let Some(visible) = resolved.visibility.compile_visibility(id) {
        println!("visible while compiling `{}`:", id);
        for member in visible {
            println!("  {}", member);
        }
    }

    Ok(())
}
