// Binary entry point for verho
// This is a thin wrapper that delegates to the library implementation

use anyhow::Result;

fn main() -> Result<()> {
    verho::cli::run()
}
