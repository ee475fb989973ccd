use std::net::IpAddr;

use crate::client::paginate::paginate;
use crate::client::{Client, SitehostError};
use crate::domain::{
    CanProvision, DeleteServer, Image, JobId, ListImages, ListServers, Location, PowerAction,
    ProvisionServer, ProvisionedServer, ResourceGroup, Server, ServerName, ServerStateInfo,
    UpdateServer, UpgradeResult, UpgradeServer, ValidationError,
};
use crate::transport::{
    decode_add_ip, decode_get_server, decode_get_server_state, decode_job_id, decode_list_images,
    decode_list_locations, decode_list_resources, decode_list_servers, decode_provision_server,
    decode_upgrade_server, decode_void_envelope, encode_add_ip, encode_can_provision,
    encode_change_state, encode_delete_server, encode_get_server, encode_get_server_state,
    encode_list_images, encode_list_locations, encode_list_resources, encode_list_servers,
    encode_provision_server, encode_update_server, encode_upgrade_plan, encode_upgrade_server,
};

impl Client {
    /// Attach an additional address to a server; returns the address assigned.
    pub async fn add_ip(&self, name: &ServerName, ip: IpAddr) -> Result<IpAddr, SitehostError> {
        self.execute(encode_add_ip(name, ip), decode_add_ip).await
    }

    /// Check that capacity exists for the requested product, location and image.
    pub async fn can_provision(&self, request: CanProvision) -> Result<(), SitehostError> {
        self.execute(encode_can_provision(&request), decode_void_envelope)
            .await
    }

    /// Power or rescue-mode transition; returns the job to wait on.
    pub async fn change_state(
        &self,
        name: &ServerName,
        action: PowerAction,
    ) -> Result<JobId, SitehostError> {
        self.execute(encode_change_state(name, action), decode_job_id)
            .await
    }

    pub async fn delete_server(&self, request: DeleteServer) -> Result<JobId, SitehostError> {
        self.execute(encode_delete_server(&request), decode_job_id)
            .await
    }

    /// Full server details, including IPs, partitions and kernels.
    pub async fn get_server(&self, name: &ServerName) -> Result<Server, SitehostError> {
        self.execute(encode_get_server(name), decode_get_server)
            .await
    }

    pub async fn get_server_state(
        &self,
        name: &ServerName,
    ) -> Result<ServerStateInfo, SitehostError> {
        self.execute(encode_get_server_state(name), decode_get_server_state)
            .await
    }

    pub async fn list_images(&self, request: ListImages) -> Result<Vec<Image>, SitehostError> {
        self.execute(encode_list_images(&request), decode_list_images)
            .await
    }

    pub async fn list_locations(&self) -> Result<Vec<Location>, SitehostError> {
        self.execute(encode_list_locations(), decode_list_locations)
            .await
    }

    pub async fn list_resources(&self) -> Result<Vec<ResourceGroup>, SitehostError> {
        self.execute(encode_list_resources(), decode_list_resources)
            .await
    }

    /// Every server matching the filters, across all pages.
    ///
    /// Rows come from the listing endpoint and only carry summary fields; use
    /// [`Client::get_server`] for partitions, kernels and full IP details.
    /// Use [`Client::list_servers_into`] to keep the rows fetched before a
    /// failing page.
    pub async fn list_servers(&self, request: ListServers) -> Result<Vec<Server>, SitehostError> {
        let mut servers = Vec::new();
        self.list_servers_into(&mut servers, request).await?;
        Ok(servers)
    }

    /// Like [`Client::list_servers`], appending into `servers` as pages arrive.
    ///
    /// On error, rows from the pages that succeeded remain in `servers`.
    pub async fn list_servers_into(
        &self,
        servers: &mut Vec<Server>,
        request: ListServers,
    ) -> Result<(), SitehostError> {
        paginate(servers, |page| {
            self.execute(encode_list_servers(&request, page), decode_list_servers)
        })
        .await
    }

    /// Start provisioning; the server is usable once `job_id` completes.
    pub async fn provision_server(
        &self,
        request: ProvisionServer,
    ) -> Result<ProvisionedServer, SitehostError> {
        self.execute(encode_provision_server(&request), decode_provision_server)
            .await
    }

    pub async fn update_server(&self, request: UpdateServer) -> Result<(), SitehostError> {
        self.execute(encode_update_server(&request), decode_void_envelope)
            .await
    }

    pub async fn upgrade_server(
        &self,
        request: UpgradeServer,
    ) -> Result<UpgradeResult, SitehostError> {
        self.execute(encode_upgrade_server(&request), decode_upgrade_server)
            .await
    }

    /// Move a server to another product plan.
    pub async fn upgrade_plan(&self, name: &ServerName, plan: &str) -> Result<(), SitehostError> {
        if plan.trim().is_empty() {
            return Err(ValidationError::Empty { field: "plan" }.into());
        }
        self.execute(encode_upgrade_plan(name, plan), decode_void_envelope)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::client::fake::FakeTransport;
    use crate::domain::{CallOption, Dimensions, JobType, ServerStateFilter};
    use crate::transport::HttpMethod;

    fn name() -> ServerName {
        ServerName::new("ch-example1").unwrap()
    }

    fn page(current: u32, total: u32, rows: usize) -> String {
        let data = vec![r#"{"name":"row"}"#; rows].join(",");
        format!(
            r#"{{"return":{{"current_page":{current},"total_pages":{total},"data":[{data}]}},"msg":"Successful","status":true}}"#
        )
    }

    #[tokio::test]
    async fn delete_server_posts_ordered_form_and_returns_job() {
        let transport = FakeTransport::new(
            200,
            r#"{"return":{"job_id":"2568630"},"msg":"Successful","status":true}"#,
        );
        let request = DeleteServer::new(
            name(),
            vec![
                CallOption::ForceDelete,
                CallOption::DeleteSubscription("immediate".to_owned()),
            ],
        )
        .unwrap();

        let job = transport.client().delete_server(request).await.unwrap();
        assert_eq!(job, JobId::new(2568630));

        let sent = transport.last_request();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, "https://example.invalid/1.0/server/delete.json");
        assert_eq!(
            sent.body.as_deref(),
            Some(
                "apikey=test-key&client_id=42&name=ch-example1&delete_subscription=immediate&force=1"
            )
        );
    }

    #[tokio::test]
    async fn list_servers_walks_all_pages() {
        let transport = FakeTransport::sequence([
            (200, page(1, 5, 0)),
            (200, page(2, 5, 1)),
            (200, page(3, 5, 2)),
            (200, page(4, 5, 3)),
            (200, page(5, 5, 4)),
        ]);
        let request = ListServers::new(vec![CallOption::FilterState(ServerStateFilter::On)]).unwrap();

        let servers = transport.client().list_servers(request).await.unwrap();
        assert_eq!(servers.len(), 10);
        assert!(servers.iter().all(|server| server.name == "row"));

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(urls.len(), 5);
        assert!(!urls[0].contains("page_number"), "{}", urls[0]);
        for (idx, url) in urls.iter().enumerate().skip(1) {
            assert!(
                url.ends_with(&format!("filters%5Bpage_number%5D={}", idx + 1)),
                "{url}"
            );
        }
    }

    #[tokio::test]
    async fn list_servers_stops_on_first_error() {
        let transport = FakeTransport::sequence([
            (200, page(1, 5, 1)),
            (200, page(2, 5, 1)),
            (500, String::new()),
            (200, page(4, 5, 1)),
        ]);
        let err = transport
            .client()
            .list_servers(ListServers::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SitehostError::HttpStatus { status: 500, .. }));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn list_servers_into_keeps_rows_before_failing_page() {
        let transport = FakeTransport::sequence([
            (200, page(1, 5, 1)),
            (200, page(2, 5, 1)),
            (500, String::new()),
            (200, page(4, 5, 1)),
        ]);
        let mut servers = vec![Server {
            name: "existing".to_owned(),
            ..Server::default()
        }];
        let err = transport
            .client()
            .list_servers_into(&mut servers, ListServers::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SitehostError::HttpStatus { status: 500, .. }));
        let names: Vec<&str> = servers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["existing", "row", "row"]);
    }

    #[tokio::test]
    async fn provision_then_wait_uses_daemon_job() {
        let transport = FakeTransport::sequence([
            (
                200,
                r#"{"return":{"job_id":"2568588","name":"example","password":"pw","ips":["223.165.66.169"],"server_id":"41186"},"msg":"Successful","status":true}"#,
            ),
            (
                200,
                r#"{"return":{"created":"2020-08-05 19:23:28","started":"2020-08-05 19:23:30","completed":"2020-08-05 19:24:02","message":"","state":"Completed","logs":[]},"status":true}"#,
            ),
        ]);
        let client = transport.client();
        let request = ProvisionServer::new(
            "example",
            "AKLCITY",
            "XENLIT",
            "ubuntu-focal",
            vec![CallOption::ParamIp(None)],
        )
        .unwrap();

        let provisioned = client.provision_server(request).await.unwrap();
        assert_eq!(provisioned.id, 41186);
        assert_eq!(
            provisioned.addresses,
            [IpAddr::V4(Ipv4Addr::new(223, 165, 66, 169))]
        );

        let job = client
            .wait_for_job(
                provisioned.job_id,
                JobType::Daemon,
                &tokio_util::sync::CancellationToken::new(),
            )
            .await
            .unwrap();
        assert!(job.state.is_terminal());

        let requests = transport.requests();
        assert!(requests[1].url.contains("job_id=2568588&type=daemon"));
    }

    #[tokio::test]
    async fn update_and_upgrade_send_their_options() {
        let transport = FakeTransport::sequence([
            (200, r#"{"return":[],"msg":"Successful","status":true}"#),
            (
                200,
                r#"{"return":{"cores":true,"disk":[]},"msg":"Successful","status":true}"#,
            ),
        ]);
        let client = transport.client();

        client
            .update_server(
                UpdateServer::new(
                    name(),
                    vec![CallOption::UpdateVnc(Dimensions::new(1024, 768))],
                )
                .unwrap(),
            )
            .await
            .unwrap();
        let upgraded = client
            .upgrade_server(UpgradeServer::new(name(), vec![CallOption::UpgradeRam(2048)]).unwrap())
            .await
            .unwrap();
        assert!(upgraded.cores);

        let requests = transport.requests();
        assert_eq!(
            requests[0].body.as_deref(),
            Some("apikey=test-key&client_id=42&name=ch-example1&updates%5Bvnc_screen%5D=1024x768")
        );
        assert_eq!(
            requests[1].body.as_deref(),
            Some("apikey=test-key&client_id=42&name=ch-example1&upgrades%5Bram%5D=2048")
        );
    }

    #[tokio::test]
    async fn change_state_returns_job_id() {
        let transport = FakeTransport::new(
            200,
            r#"{"return":{"job_id":"77"},"msg":"Successful","status":true}"#,
        );
        let job = transport
            .client()
            .change_state(&name(), PowerAction::Reboot)
            .await
            .unwrap();
        assert_eq!(job, JobId::new(77));
        assert!(
            transport
                .last_request()
                .body
                .unwrap()
                .ends_with("state=reboot")
        );
    }

    #[tokio::test]
    async fn upgrade_plan_rejects_blank_plan_without_sending() {
        let transport = FakeTransport::new(200, r#"{"status":true}"#);
        let err = transport
            .client()
            .upgrade_plan(&name(), "  ")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SitehostError::Validation(ValidationError::Empty { field: "plan" })
        ));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn get_server_state_reads_rescue_flag() {
        let transport = FakeTransport::new(
            200,
            r#"{"return":{"state":"On","rescue":"1"},"msg":"Successful","status":true}"#,
        );
        let state = transport
            .client()
            .get_server_state(&name())
            .await
            .unwrap();
        assert_eq!(state.state, "On");
        assert!(state.rescue);
        assert!(
            transport
                .last_request()
                .url
                .ends_with("/server/get_state.json?apikey=test-key&client_id=42&name=ch-example1")
        );
    }
}
