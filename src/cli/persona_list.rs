use crate::core::config::Config;
use crate::core::persona::PersonaCatalog;

pub fn list_personas(config: &Config) {
    println!("Available personas:\n");
    for line in persona_lines(config) {
        println!("{line}");
    }
    println!("\n💡 Chat with a persona using:");
    println!("   parley -P <persona_id>");
}

fn persona_lines(config: &Config) -> Vec<String> {
    let catalog = PersonaCatalog::from_config(config);
    let default = config.default_persona.as_deref();
    catalog
        .list()
        .iter()
        .map(|persona| {
            let marker = match default {
                Some(id) if persona.id.eq_ignore_ascii_case(id) => " (default)",
                _ => "",
            };
            let mut line = format!("  • {} {}{}", persona.avatar, persona.id, marker);
            if !persona.description.is_empty() {
                line.push_str(&format!(" - {}", persona.description));
            }
            line
        })
        .collect()
}
