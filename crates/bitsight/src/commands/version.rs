pub fn run() -> anyhow::Result<()> {
    println!("bitsight {}", env!("CARGO_PKG_VERSION"));
    println!("BitSight security ratings collector");
    Ok(())
}
