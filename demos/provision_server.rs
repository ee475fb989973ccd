use std::io;

use sitehost::{CallOption, CanProvision, CancellationToken, Client, JobType, ProvisionServer};

fn required(name: &str) -> Result<String, io::Error> {
    std::env::var(name).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} environment variable is required"),
        )
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let label = required("SITEHOST_LABEL")?;
    let location = std::env::var("SITEHOST_LOCATION").unwrap_or_else(|_| "AKLCITY".to_owned());
    let product = std::env::var("SITEHOST_PRODUCT").unwrap_or_else(|_| "XENLIT".to_owned());
    let image = std::env::var("SITEHOST_IMAGE").unwrap_or_else(|_| "ubuntu-jammy.amd64".to_owned());

    let client = Client::from_env()?;
    client
        .can_provision(CanProvision::new(&product, &location, &image, Vec::new())?)
        .await?;

    let request = ProvisionServer::new(
        label,
        location,
        product,
        image,
        vec![CallOption::ParamIp(None), CallOption::ParamSendEmail],
    )?;
    let provisioned = client.provision_server(request).await?;
    println!(
        "provisioning {} (id {}), job {}",
        provisioned.name, provisioned.id, provisioned.job_id
    );

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    let job = client
        .wait_for_job(provisioned.job_id, JobType::Daemon, &cancel)
        .await?;
    println!("job {}: {}", provisioned.job_id, job.state.as_str());
    for log in &job.logs {
        println!("  [{}] {}", log.level, log.message);
    }

    let server = client.get_server(&sitehost::ServerName::new(provisioned.name)?).await?;
    for ip in &server.ips {
        println!("  {}/{}", ip.addr, ip.prefix);
    }
    Ok(())
}
