//! Full project lifecycle against the live mock server, in both formats.
//!
//! # Design
//! Starts the mock server on a random port, then exercises the manager's
//! operations over real HTTP using ureq. Validates that request building and
//! response parsing work end-to-end with the actual server.

use redmine_core::{
    HttpMethod, HttpRequest, HttpResponse, IdentifiableName, MimeFormat, Project, RedmineError,
    RedmineManager,
};

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the manager
/// handle status interpretation.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match req.method {
        HttpMethod::Get | HttpMethod::Delete => {
            let mut builder = if req.method == HttpMethod::Get {
                agent.get(&req.path)
            } else {
                agent.delete(&req.path)
            };
            for (name, value) in &req.headers {
                builder = builder.header(name, value);
            }
            builder.call()
        }
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
            let mut builder = match req.method {
                HttpMethod::Post => agent.post(&req.path),
                HttpMethod::Put => agent.put(&req.path),
                _ => agent.patch(&req.path),
            };
            for (name, value) in &req.headers {
                builder = builder.header(name, value);
            }
            builder.send(req.body.as_deref().unwrap_or_default())
        }
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_vec().unwrap_or_default();
    HttpResponse::new(status, body)
}

/// Start a fresh mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn lifecycle(format: MimeFormat) {
    let host = start_server();
    let manager = RedmineManager::new(&host, format).with_api_key(mock_server::API_KEY);

    // Step 1: list, should be empty.
    let req = manager.build_get_paginated_objects::<Project>(&[]).unwrap();
    let page = manager.parse_get_paginated_objects::<Project>(execute(req)).unwrap();
    assert!(page.objects.is_empty(), "{format}: expected empty list");
    assert_eq!(page.total_count, 0);

    // Step 2: a blank name is rejected with the server's messages.
    let req = manager
        .build_create_object(&Project::new("", "blank"), None)
        .unwrap();
    let err = manager.parse_create_object::<Project>(execute(req)).unwrap_err();
    assert!(
        matches!(&err, RedmineError::Validation(m) if m == &["Name cannot be blank"]),
        "{format}: {err}"
    );

    // Step 3: create a parent project.
    let input = Project {
        description: Some("Top level".to_string()),
        ..Project::new("Docs", "docs")
    };
    let req = manager.build_create_object(&input, None).unwrap();
    let parent: Project = manager.parse_create_object(execute(req)).unwrap();
    assert_eq!(parent.id, 1, "{format}");
    assert_eq!(parent.name.as_deref(), Some("Docs"));
    assert_eq!(parent.description.as_deref(), Some("Top level"));
    assert!(parent.created_on.is_some(), "{format}: created_on");

    // Step 4: create a child. XML omits parent_id until the project exists,
    // so the parent is attached by the update below in that format.
    let child_input = Project {
        parent: Some(IdentifiableName::new(parent.id)),
        ..Project::new("API", "api")
    };
    let req = manager.build_create_object(&child_input, None).unwrap();
    let mut child: Project = manager.parse_create_object(execute(req)).unwrap();
    match format {
        MimeFormat::Json => assert_eq!(child.parent, Some(IdentifiableName::new(1))),
        MimeFormat::Xml => assert_eq!(child.parent, None),
    }

    // Step 5: update the child; now that it has an id the parent goes out in
    // both formats.
    child.name = Some("Public API".to_string());
    child.parent = Some(IdentifiableName::new(parent.id));
    let req = manager.build_update_object(child.id, &child).unwrap();
    manager.parse_update_object(execute(req)).unwrap();

    // Step 6: get by identifier and check the update landed.
    let req = manager.build_get_object::<Project>("api", &[]).unwrap();
    let fetched: Project = manager.parse_get_object(execute(req)).unwrap();
    assert_eq!(fetched, child, "{format}: same id and identifier");
    assert_eq!(fetched.name.as_deref(), Some("Public API"));
    let fetched_parent = fetched.parent.expect("parent after update");
    assert_eq!(fetched_parent.id, 1);
    assert_eq!(fetched_parent.name.as_deref(), Some("Docs"));

    // Step 7: walk the collection one page at a time.
    let mut seen = Vec::new();
    let mut offset = 0;
    loop {
        let offset_param = offset.to_string();
        let req = manager
            .build_get_paginated_objects::<Project>(&[("limit", "1"), ("offset", &offset_param)])
            .unwrap();
        let page = manager.parse_get_paginated_objects::<Project>(execute(req)).unwrap();
        assert_eq!(page.total_count, 2, "{format}");
        assert_eq!(page.limit, 1, "{format}");
        seen.extend(page.objects.iter().filter_map(|p| p.identifier.clone()));
        if !page.has_next_page() {
            break;
        }
        offset = page.next_offset();
    }
    assert_eq!(seen, vec!["docs", "api"], "{format}");

    // Step 8: upload some bytes and get a token back.
    let req = manager.build_upload_file(b"release notes".to_vec());
    let upload = manager.parse_upload_file(execute(req)).unwrap();
    assert!(upload.token.is_some_and(|t| t.starts_with("1.")), "{format}");

    // Step 9: delete the child.
    let req = manager.build_delete_object::<Project>(child.id).unwrap();
    manager.parse_delete_object(execute(req)).unwrap();

    // Step 10: get after delete, 404.
    let req = manager.build_get_object::<Project>(child.id, &[]).unwrap();
    let err = manager.parse_get_object::<Project>(execute(req)).unwrap_err();
    assert!(matches!(err, RedmineError::NotFound), "{format}: {err}");

    // Step 11: without the key the server refuses.
    let anonymous = RedmineManager::new(&host, format);
    let req = anonymous.build_get_paginated_objects::<Project>(&[]).unwrap();
    let err = anonymous
        .parse_get_paginated_objects::<Project>(execute(req))
        .unwrap_err();
    assert!(matches!(err, RedmineError::Unauthorized), "{format}: {err}");
}

#[test]
fn xml_lifecycle() {
    lifecycle(MimeFormat::Xml);
}

#[test]
fn json_lifecycle() {
    lifecycle(MimeFormat::Json);
}
