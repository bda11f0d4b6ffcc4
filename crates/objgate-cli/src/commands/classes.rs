//! `objgate classes`: list the classes a client can reach.

pub fn execute(package: Option<&str>) -> anyhow::Result<()> {
    let registry = super::stdlib_registry();
    let prefix = package.map(|p| format!("{}.", p.trim_end_matches('.')));
    let names: Vec<String> = registry
        .names()
        .into_iter()
        .filter(|name| prefix.as_deref().map_or(true, |p| name.starts_with(p)))
        .collect();

    if names.is_empty() {
        anyhow::bail!("no classes under {}", package.unwrap_or("<root>"));
    }
    for name in &names {
        println!("{}", name);
    }
    Ok(())
}
