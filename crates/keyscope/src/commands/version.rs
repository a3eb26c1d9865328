pub fn run() -> anyhow::Result<()> {
    println!("keyscope {}", env!("CARGO_PKG_VERSION"));
    println!("Analytics query compiler for key, log and ratelimit dashboards");
    Ok(())
}
