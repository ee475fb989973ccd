use std::io;

use sitehost::{CancellationToken, Client, JobType, PowerAction, ServerName};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let name = std::env::var("SITEHOST_SERVER").map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "SITEHOST_SERVER environment variable is required",
        )
    })?;
    let action = match std::env::var("SITEHOST_ACTION").as_deref() {
        Ok("power_on") => PowerAction::PowerOn,
        Ok("power_off") => PowerAction::PowerOff,
        Ok("rescue_on") => PowerAction::RescueOn,
        Ok("rescue_off") => PowerAction::RescueOff,
        _ => PowerAction::Reboot,
    };

    let client = Client::from_env()?;
    let name = ServerName::new(name)?;

    let job_id = client.change_state(&name, action).await?;
    let job = client
        .wait_for_job(job_id, JobType::Daemon, &CancellationToken::new())
        .await?;
    let state = client.get_server_state(&name).await?;
    println!(
        "{} {}: job {}, server now {} (rescue: {})",
        name,
        action.as_str(),
        job.state.as_str(),
        state.state,
        state.rescue
    );

    Ok(())
}
