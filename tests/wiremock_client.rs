use std::time::Duration;

use sitehost::{
    ApiKey, CallOption, CancellationToken, Client, ClientId, DeleteServer, JobId, JobState,
    JobType, ListServers, PollConfig, ServerName, ServerStateFilter, SitehostError,
};
use wiremock::matchers::{body_string, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> Client {
    Client::builder(ApiKey::new("secret").unwrap(), ClientId::new(1))
        .endpoint(format!("{}/1.0/", server.uri()))
        .poll_config(
            PollConfig::default()
                .delay(Duration::from_millis(10))
                .min_interval(Duration::from_millis(10)),
        )
        .build()
        .unwrap()
}

fn list_page(current: u32, total: u32, name: &str) -> String {
    format!(
        r#"{{"return":{{"current_page":{current},"total_pages":{total},"data":[{{"server_id":"{current}","name":"{name}","label":"{name}","client_id":"1","created":"2020-01-01 00:00:00","type":"VPS","state":"On","locked":"0","rescue":"0","cores":"2","ram":"2","disk":"40","location":"AKLCITY","product_code":"XENLIT","primary_ips":[]}}]}},"msg":"Successful","status":true}}"#
    )
}

#[tokio::test]
async fn delete_server_posts_form_in_declared_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1.0/server/delete.json"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(
            "apikey=secret&client_id=1&name=ch-example1&delete_subscription=immediate&force=1",
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"return":{"job_id":"2568630"},"msg":"Successful","status":true}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = DeleteServer::new(
        ServerName::new("ch-example1").unwrap(),
        vec![
            CallOption::DeleteSubscription("immediate".to_owned()),
            CallOption::ForceDelete,
        ],
    )
    .unwrap();
    let job = client(&server).delete_server(request).await.unwrap();
    assert_eq!(job, JobId::new(2568630));
}

#[tokio::test]
async fn list_servers_follows_page_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/server/list_servers.json"))
        .and(query_param("apikey", "secret"))
        .and(query_param("filters[state]", "On"))
        .and(query_param_is_missing("filters[page_number]"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_page(1, 3, "alpha")))
        .expect(1)
        .mount(&server)
        .await;
    for (page, name) in [(2, "beta"), (3, "gamma")] {
        Mock::given(method("GET"))
            .and(path("/1.0/server/list_servers.json"))
            .and(query_param("filters[page_number]", page.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(list_page(page, 3, name)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let request = ListServers::new(vec![CallOption::FilterState(ServerStateFilter::On)]).unwrap();
    let servers = client(&server).list_servers(request).await.unwrap();

    let names: Vec<&str> = servers.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["alpha", "beta", "gamma"]);
    assert_eq!(servers[0].ram, 2048);
    assert_eq!(servers[0].location_code, "AKLCITY");
}

#[tokio::test]
async fn wait_for_job_polls_until_completed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.0/job/get.json"))
        .and(query_param("job_id", "2568588"))
        .and(query_param("type", "daemon"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"return":{"created":"2020-08-05 19:23:28","started":"2020-08-05 19:23:30","completed":"0000-00-00 00:00:00","message":"","state":"Running","logs":[]},"msg":"Successful","status":true}"#,
        ))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.0/job/get.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"return":{"created":"2020-08-05 19:23:28","started":"2020-08-05 19:23:30","completed":"2020-08-05 19:24:02","message":"","state":"Completed","logs":[{"date":"2020-08-05 19:24:02","level":"1","message":"done"}]},"msg":"Successful","status":true}"#,
        ))
        .mount(&server)
        .await;

    let job = client(&server)
        .wait_for_job(JobId::new(2568588), JobType::Daemon, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(job.state, JobState::Completed);
    assert_eq!(job.logs.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn error_statuses_and_bad_bodies_are_distinguished() {
    let server = MockServer::start().await;
    Mock::given(path("/1.0/server/get_server.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(path("/1.0/server/get_state.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;
    Mock::given(path("/1.0/api/get_info.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"msg":"Unauthorised. The Api key is missing.","status":false}"#,
        ))
        .mount(&server)
        .await;

    let client = client(&server);
    let name = ServerName::new("ch-example1").unwrap();

    let err = client.get_server(&name).await.unwrap_err();
    assert!(
        matches!(err, SitehostError::HttpStatus { status: 503, body: None }),
        "{err:?}"
    );

    let err = client.get_server_state(&name).await.unwrap_err();
    assert!(
        matches!(err, SitehostError::Decode { endpoint: "/server/get_state.json", .. }),
        "{err:?}"
    );

    let err = client.info().await.unwrap_err();
    match err {
        SitehostError::Api { message } => {
            assert_eq!(message, "Unauthorised. The Api key is missing.")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn invalid_endpoint_is_rejected_at_build() {
    let err = Client::builder(ApiKey::new("secret").unwrap(), ClientId::new(1))
        .endpoint("ftp://example.com/1.0")
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, SitehostError::Validation(_)), "{err:?}");
}
