//! `gantry new` command

use anyhow::Result;

use gantry::ops::gantry_new::{new_module, new_project};
use gantry::util::GlobalContext;

use crate::cli::NewArgs;

pub fn execute(args: NewArgs) -> Result<()> {
    let ctx = GlobalContext::new()?;

    if args.module {
        let root = ctx.find_project_root().ok_or_else(|| {
            anyhow::anyhow!(
                "`--module` requires an existing project; no Gantry.toml found from {}",
                ctx.cwd().display()
            )
        })?;
        new_module(&root, &args.name)?;
        println!("     Created module `{}`", args.name);
    } else {
        let path = args
            .path
            .unwrap_or_else(|| ctx.cwd().join(&args.name));
        new_project(&path, &args.name)?;
        println!("     Created project `{}` at {}", args.name, path.display());
    }

    Ok(())
}
