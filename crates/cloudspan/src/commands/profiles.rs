use cloudspan_config::LoadedProfiles;
use colored::Colorize;

pub fn handle(loaded: &LoadedProfiles) {
    eprintln!("{}", format!("Profiles from {}", loaded.path.display()).dimmed());
    if loaded.file.profiles.is_empty() {
        println!("{}", "No profiles defined".dimmed());
        return;
    }

    for (name, profile) in &loaded.file.profiles {
        let placement = [
            Some(profile.region.region()),
            profile.region.zone(),
            profile.region.resource_group(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("/");
        println!(
            "{}  {}  {}",
            name.cyan().bold(),
            profile.driver.green(),
            placement
        );
    }
}
