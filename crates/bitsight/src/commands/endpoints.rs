use bitsight_core::EndpointCatalog;

fn render_catalog(catalog: &EndpointCatalog) -> String {
    let width = catalog.names().map(str::len).max().unwrap_or(0);
    let mut lines = vec![format!("{} endpoints", catalog.len())];
    for (name, template) in catalog.iter() {
        lines.push(format!("  {:width$}  {}", name, template, width = width));
    }
    lines.join("\n")
}

pub fn run() -> anyhow::Result<()> {
    println!("{}", render_catalog(EndpointCatalog::global()));
    Ok(())
}
