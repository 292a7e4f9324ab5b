/*!
Command dispatcher module: declarations and re-exports only.

Layout:
  src/cmd/
    mod.rs       (this file)
    info.rs      (InfoArgs + execute_info)
    list.rs      (ListArgs + execute_list)
    snapshot.rs  (SnapshotArgs + execute_snapshot)
    shared.rs    (Workspace: repo detection, index, registry)
    format.rs    (boxes, tables, colors for human output)

Conventions:
  - Each subcommand module exposes exactly one public `execute_*` function
    taking its args plus the shared `Workspace` and returning
    `anyhow::Result<()>`.
  - Argument structs derive `clap::Args` and are kept minimal.
*/

pub mod format;
pub mod info;
pub mod list;
pub mod shared;
pub mod snapshot;

pub use info::{InfoArgs, execute_info};
pub use list::{ListArgs, execute_list};
pub use shared::Workspace;
pub use snapshot::{SnapshotArgs, execute_snapshot};
