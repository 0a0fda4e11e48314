//! `editorial init`.

use anyhow::Result;

use editorial::editorial_config::EditorialConfig;

pub fn cmd_init(config: &EditorialConfig) -> Result<()> {
    use editorial::init::init_project;

    let result = init_project(&config.project_dir)?;

    if result.created {
        println!(
            "Initialized editorial project at {}",
            result.editorial_dir.display()
        );
        println!();
        println!("Created directory structure:");
        println!("  .editorial/");
        println!("  ├── editorial.toml   # policy, storage and logging settings");
        println!("  └── data/            # review queue and learning state");
        println!();
        println!("Next steps:");
        println!("  1. Adjust [policy] in .editorial/editorial.toml");
        println!("  2. Run `editorial submit <file.html> --topic <topic>`");
        println!("  3. Work the queue with `editorial queue list`");
    } else if result.config_written {
        println!(
            "Completed editorial initialization at {}",
            result.editorial_dir.display()
        );
    } else {
        println!(
            "Editorial project already initialized at {}",
            result.editorial_dir.display()
        );
        println!("Directory structure verified.");
    }

    Ok(())
}
