use sitehost::{CallOption, Client, ListServers, ServerStateFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let info = client.info().await?;
    println!("modules: {}", info.modules.join(", "));

    let mut options = Vec::new();
    if std::env::var("SITEHOST_ONLY_RUNNING").is_ok() {
        options.push(CallOption::FilterState(ServerStateFilter::On));
    }
    let servers = client.list_servers(ListServers::new(options)?).await?;
    for server in &servers {
        let ips: Vec<String> = server.ips.iter().map(|ip| ip.addr.to_string()).collect();
        println!(
            "{:<24} {:<24} {:<6} {}c/{}MB/{}GB {} [{}]",
            server.name,
            server.label,
            server.state,
            server.cores,
            server.ram,
            server.disk,
            server.location_code,
            ips.join(" ")
        );
    }
    println!("{} server(s)", servers.len());

    Ok(())
}
