//! `objgate help`: print a class help page.

use objgate_engine::reflect::help::help_page;

pub fn execute(class: &str, pattern: Option<&str>, short: bool) -> anyhow::Result<()> {
    let gateway = super::stdlib_gateway();
    let resolved = gateway.resolve_class(class, gateway.default_view().map(|v| v.as_ref()))?;
    print!("{}", help_page(&resolved, gateway.classes(), pattern, short));
    Ok(())
}
