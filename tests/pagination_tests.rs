//! Integration tests for page following and item streaming.

#[cfg(test)]
mod pagination_tests {
    use futures::StreamExt;
    use integrations_github_pagination::mocks::{MockResponse, MockTransport};
    use integrations_github_pagination::services::{ListIssuesParams, INERTIA_PREVIEW};
    use integrations_github_pagination::{
        CancelHandle, Completion, GitHubClient, GitHubError, GitHubErrorKind, Observer, Page,
        PageRequest, PaginationParams,
    };
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::time::Duration;

    const ISSUES: &str = "/repos/octocat/hello-world/issues";

    fn api(path: &str) -> String {
        format!("https://api.github.com{}", path)
    }

    /// Registers pages of 3, 3 and 1 items chained by next links.
    fn three_pages(mock: &MockTransport) {
        mock.on_get(
            ISSUES,
            MockResponse::ok(&[1, 2, 3]).with_next_link(&api("/repositories/1/issues?page=2")),
        );
        mock.on_get(
            "/repositories/1/issues?page=2",
            MockResponse::ok(&[4, 5, 6]).with_next_link(&api("/repositories/1/issues?page=3")),
        );
        mock.on_get("/repositories/1/issues?page=3", MockResponse::ok(&[7]));
    }

    fn client(mock: &MockTransport) -> GitHubClient {
        mock.client().unwrap()
    }

    fn issues_request() -> PageRequest {
        PageRequest::new(ISSUES).unwrap()
    }

    #[derive(Default)]
    struct Collector {
        items: Vec<u32>,
        error: Option<GitHubError>,
        completed: bool,
        cancel: Option<(u32, CancelHandle)>,
    }

    impl Observer<u32> for Collector {
        fn on_next(&mut self, item: u32) {
            self.items.push(item);
            if let Some((at, handle)) = &self.cancel {
                if item == *at {
                    handle.cancel();
                }
            }
        }

        fn on_error(&mut self, error: GitHubError) {
            self.error = Some(error);
        }

        fn on_completed(&mut self) {
            self.completed = true;
        }
    }

    #[tokio::test]
    async fn test_flattens_pages_in_order() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let items: Vec<u32> = client.get_all(issues_request()).await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(items[0], 1);
        assert_eq!(items[4], 5);
        assert_eq!(items[6], 7);
        assert_eq!(mock.request_count(), 3);
        assert_eq!(client.metrics().pages_fetched(), 3);
    }

    #[tokio::test]
    async fn test_stream_completes_after_last_page() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let mut collector = Collector::default();
        let completion = client
            .get_and_flatten_all_pages::<u32>(issues_request())
            .subscribe()
            .run(&mut collector)
            .await;

        assert_eq!(completion, Completion::Completed);
        assert!(collector.completed);
        assert!(collector.error.is_none());
        assert_eq!(collector.items.len(), 7);
    }

    #[tokio::test]
    async fn test_pager_walks_pages() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let mut pager = client.get_all_pages::<u32>(issues_request());
        assert!(pager.has_more());
        assert_eq!(mock.request_count(), 0);

        let first = pager.next_page().await.unwrap().unwrap();
        assert_eq!(first.items, vec![1, 2, 3]);
        assert!(first.has_next());
        assert_eq!(mock.request_count(), 1);

        let second = pager.next_page().await.unwrap().unwrap();
        assert_eq!(second.page, Some(2));

        let third = pager.next_page().await.unwrap().unwrap();
        assert_eq!(third.items, vec![7]);
        assert!(!third.has_next());
        assert!(!pager.has_more());

        assert!(pager.next_page().await.unwrap().is_none());
        assert_eq!(pager.pages_fetched(), 3);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_max_pages_stops_early() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let request = issues_request()
            .with_window(PaginationParams::new().max_pages(2))
            .unwrap();
        let items: Vec<u32> = client.get_all(request).await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.pending_responses(), 1);
    }

    #[tokio::test]
    async fn test_max_pages_larger_than_chain() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let request = issues_request()
            .with_window(PaginationParams::new().max_pages(10))
            .unwrap();
        let items: Vec<u32> = client.get_all(request).await.unwrap();

        assert_eq!(items.len(), 7);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_failure_aborts_chain() {
        let mock = MockTransport::new();
        mock.on_get(
            ISSUES,
            MockResponse::ok(&[1, 2, 3]).with_next_link(&api("/repositories/1/issues?page=2")),
        );
        mock.on_get(
            "/repositories/1/issues?page=2",
            MockResponse::server_error("Server Error"),
        );
        mock.on_get("/repositories/1/issues?page=3", MockResponse::ok(&[7]));
        let client = client(&mock);

        let mut items = client.get_and_flatten_all_pages::<u32>(issues_request());

        let mut seen = Vec::new();
        let mut error = None;
        while let Some(item) = items.next().await {
            match item {
                Ok(item) => seen.push(item),
                Err(e) => error = Some(e),
            }
        }

        assert_eq!(seen, vec![1, 2, 3]);
        let error = error.unwrap();
        assert_eq!(*error.kind(), GitHubErrorKind::InternalError);
        assert_eq!(error.status_code(), Some(500));
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.pending_responses(), 1);
    }

    #[tokio::test]
    async fn test_failure_reported_to_observer_once() {
        let mock = MockTransport::new();
        mock.on_get(
            ISSUES,
            MockResponse::ok(&[1]).with_next_link(&api("/repositories/1/issues?page=2")),
        );
        mock.on_get("/repositories/1/issues?page=2", MockResponse::not_found("Not Found"));
        let client = client(&mock);

        let mut collector = Collector::default();
        let completion = client
            .get_and_flatten_all_pages::<u32>(issues_request())
            .subscribe()
            .run(&mut collector)
            .await;

        assert_eq!(completion, Completion::Failed);
        assert_eq!(collector.items, vec![1]);
        assert!(!collector.completed);
        assert_eq!(*collector.error.unwrap().kind(), GitHubErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_pager_is_done_after_error() {
        let mock = MockTransport::new();
        mock.on_get(ISSUES, MockResponse::server_error("boom"));
        let client = client(&mock);

        let mut pager = client.get_all_pages::<u32>(issues_request());
        assert!(pager.next_page().await.is_err());
        assert!(!pager.has_more());
        assert!(pager.next_page().await.unwrap().is_none());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_after_first_page() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let subscription = client
            .get_and_flatten_all_pages::<u32>(issues_request())
            .subscribe();
        let mut collector = Collector {
            cancel: Some((3, subscription.cancel_handle())),
            ..Collector::default()
        };

        let completion = subscription.run(&mut collector).await;

        assert_eq!(completion, Completion::Cancelled);
        assert_eq!(collector.items, vec![1, 2, 3]);
        assert!(!collector.completed);
        assert!(collector.error.is_none());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_cancel_mid_page() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let subscription = client
            .get_and_flatten_all_pages::<u32>(issues_request())
            .subscribe();
        let mut collector = Collector {
            cancel: Some((5, subscription.cancel_handle())),
            ..Collector::default()
        };

        let completion = subscription.run(&mut collector).await;

        assert_eq!(completion, Completion::Cancelled);
        assert_eq!(collector.items, vec![1, 2, 3, 4, 5]);
        assert_eq!(mock.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cancel_while_page_in_flight() {
        let mock = MockTransport::new();
        mock.on_get(
            ISSUES,
            MockResponse::ok(&[1, 2, 3]).with_next_link(&api("/repositories/1/issues?page=2")),
        );
        mock.on_get(
            "/repositories/1/issues?page=2",
            MockResponse::ok(&[4, 5, 6])
                .with_next_link(&api("/repositories/1/issues?page=3"))
                .with_delay(Duration::from_millis(200)),
        );
        mock.on_get("/repositories/1/issues?page=3", MockResponse::ok(&[7]));
        let client = client(&mock);

        let mut subscription = client
            .get_and_flatten_all_pages::<u32>(issues_request())
            .subscribe();
        for expected in 1..=3 {
            assert_eq!(subscription.next().await.unwrap().unwrap(), expected);
        }

        let handle = subscription.cancel_handle();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        assert!(subscription.next().await.is_none());
        canceller.await.unwrap();

        assert_eq!(subscription.completion(), Some(Completion::Cancelled));
        assert_eq!(subscription.items_emitted(), 3);
        assert!(subscription.next().await.is_none());
        assert_eq!(mock.request_count(), 2);
        assert_eq!(mock.pending_responses(), 1);
    }

    #[tokio::test]
    async fn test_dropping_stream_stops_fetching() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let first: Vec<u32> = client
            .get_and_flatten_all_pages::<u32>(issues_request())
            .take(2)
            .map(|item| item.unwrap())
            .collect()
            .await;

        assert_eq!(first, vec![1, 2]);
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_blank_location_is_rejected_before_any_request() {
        let mock = MockTransport::new();
        let client = client(&mock);

        for location in ["", "   ", "\t"] {
            let err = PageRequest::new(location).unwrap_err();
            assert!(err.is_invalid_argument());
        }

        let err = client
            .issues()
            .stream(" ", "hello-world", &ListIssuesParams::default(), PaginationParams::new())
            .err()
            .unwrap();
        assert_eq!(*err.kind(), GitHubErrorKind::MissingParameter);
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_zero_window_is_rejected() {
        for window in [
            PaginationParams::new().page(0),
            PaginationParams::new().per_page(0),
            PaginationParams::new().max_pages(0),
        ] {
            let err = issues_request().with_window(window).unwrap_err();
            assert_eq!(*err.kind(), GitHubErrorKind::InvalidParameter);
        }
    }

    #[tokio::test]
    async fn test_window_and_parameters_in_query() {
        let mock = MockTransport::new();
        mock.on_get(
            &format!("{}?page=2&per_page=10&state=open", ISSUES),
            MockResponse::ok(&[11, 12]),
        );
        let client = client(&mock);

        let mut parameters = BTreeMap::new();
        parameters.insert("state".to_string(), "open".to_string());
        let original = parameters.clone();

        let request = issues_request()
            .with_parameters(&parameters)
            .with_window(PaginationParams::new().page(2).per_page(10))
            .unwrap();
        let items: Vec<u32> = client.get_all(request).await.unwrap();

        assert_eq!(items, vec![11, 12]);
        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query.as_deref(), Some("page=2&per_page=10&state=open"));
        assert_eq!(parameters, original);
    }

    #[tokio::test]
    async fn test_next_link_used_verbatim() {
        let mock = MockTransport::new();
        mock.on_get(
            &format!("{}?per_page=2&state=closed", ISSUES),
            MockResponse::ok(&[1, 2]).with_next_link(&api(
                "/repositories/1/issues?per_page=2&state=closed&page=2",
            )),
        );
        mock.on_get(
            "/repositories/1/issues?per_page=2&state=closed&page=2",
            MockResponse::ok(&[3]),
        );
        let client = client(&mock);

        let request = issues_request()
            .with_parameter("state", "closed")
            .with_window(PaginationParams::new().per_page(2))
            .unwrap();
        let items: Vec<u32> = client.get_all(request).await.unwrap();

        assert_eq!(items, vec![1, 2, 3]);
        let requests = mock.requests();
        assert_eq!(
            requests[1].query.as_deref(),
            Some("per_page=2&state=closed&page=2")
        );
    }

    #[tokio::test]
    async fn test_follows_next_link_with_comma_in_query() {
        let mock = MockTransport::new();
        mock.on_get(
            &format!("{}?labels=bug%2Cui", ISSUES),
            MockResponse::ok(&[1, 2]).with_header(
                "link",
                &format!(
                    "<{}>; rel=\"next\", <{}>; rel=\"last\"",
                    api("/repositories/1/issues?labels=bug,ui&page=2"),
                    api("/repositories/1/issues?labels=bug,ui&page=3")
                ),
            ),
        );
        mock.on_get(
            "/repositories/1/issues?labels=bug,ui&page=2",
            MockResponse::ok(&[3])
                .with_next_link(&api("/repositories/1/issues?labels=bug,ui&page=3")),
        );
        mock.on_get("/repositories/1/issues?labels=bug,ui&page=3", MockResponse::ok(&[4]));
        let client = client(&mock);

        let request = issues_request().with_parameter("labels", "bug,ui");
        let items: Vec<u32> = client.get_all(request).await.unwrap();

        assert_eq!(items, vec![1, 2, 3, 4]);
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_accept_override_kept_on_every_page() {
        let mock = MockTransport::new();
        let projects = "/repos/octocat/hello-world/projects";
        mock.on_get(
            projects,
            MockResponse::ok(&serde_json::json!([])).with_next_link(&api(
                "/repositories/1/projects?page=2",
            )),
        );
        mock.on_get("/repositories/1/projects?page=2", MockResponse::ok(&serde_json::json!([])));
        let client = client(&mock);

        let request = PageRequest::new(projects)
            .unwrap()
            .with_accept(INERTIA_PREVIEW);
        let items: Vec<serde_json::Value> = client.get_all(request).await.unwrap();

        assert!(items.is_empty());
        let requests = mock.requests();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert_eq!(request.header("accept"), Some(INERTIA_PREVIEW));
        }
    }

    #[tokio::test]
    async fn test_untrusted_next_link_is_not_followed() {
        let mock = MockTransport::new();
        mock.on_get(
            ISSUES,
            MockResponse::ok(&[1, 2, 3]).with_next_link("https://evil.example.com/collect?page=2"),
        );
        let client = client(&mock);

        let mut items = client.get_and_flatten_all_pages::<u32>(issues_request());
        let mut seen = Vec::new();
        let mut error = None;
        while let Some(item) = items.next().await {
            match item {
                Ok(item) => seen.push(item),
                Err(e) => error = Some(e),
            }
        }

        assert_eq!(seen, vec![1, 2, 3]);
        let error = error.unwrap();
        assert_eq!(*error.kind(), GitHubErrorKind::UntrustedLink);
        assert!(error.is_transport());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_aborts_chain() {
        let mock = MockTransport::new();
        mock.on_get(
            ISSUES,
            MockResponse::ok(&[1]).with_next_link(&api("/repositories/1/issues?page=2")),
        );
        mock.on_get(
            "/repositories/1/issues?page=2",
            MockResponse::raw(200, "<html>oops</html>"),
        );
        let client = client(&mock);

        let err = client.get_all::<u32>(issues_request()).await.unwrap_err();
        assert_eq!(*err.kind(), GitHubErrorKind::DeserializationError);
    }

    #[tokio::test]
    async fn test_empty_results() {
        let mock = MockTransport::new();
        mock.on_get(ISSUES, MockResponse::ok(&Vec::<u32>::new()));
        mock.on_get("/user/repos", MockResponse::raw(200, ""));
        let client = client(&mock);

        let items: Vec<u32> = client.get_all(issues_request()).await.unwrap();
        assert!(items.is_empty());

        let items: Vec<u32> = client
            .get_all(PageRequest::new("/user/repos").unwrap())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn test_enveloped_page() {
        let mock = MockTransport::new();
        mock.on_get(
            "/search/issues?q=bug",
            MockResponse::ok(&serde_json::json!({
                "total_count": 2,
                "incomplete_results": false,
                "items": [10, 20]
            })),
        );
        let client = client(&mock);

        let request = PageRequest::new("/search/issues")
            .unwrap()
            .with_parameter("q", "bug");
        let page: Page<u32> = client.get_page(&request).await.unwrap();

        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_count, Some(2));
    }

    #[tokio::test]
    async fn test_independent_chains_run_concurrently() {
        let mock = MockTransport::new();
        mock.on_get(
            "/a",
            MockResponse::ok(&[1, 2])
                .with_next_link(&api("/a?page=2"))
                .with_delay(Duration::from_millis(20)),
        );
        mock.on_get("/a?page=2", MockResponse::ok(&[3]));
        mock.on_get(
            "/b",
            MockResponse::ok(&[10])
                .with_next_link(&api("/b?page=2"))
                .with_delay(Duration::from_millis(5)),
        );
        mock.on_get(
            "/b?page=2",
            MockResponse::ok(&[20, 30]).with_delay(Duration::from_millis(5)),
        );
        let client = client(&mock);

        let a = client.get_all::<u32>(PageRequest::new("/a").unwrap());
        let b = client.get_all::<u32>(PageRequest::new("/b").unwrap());
        let (a, b) = tokio::join!(a, b);

        assert_eq!(a.unwrap(), vec![1, 2, 3]);
        assert_eq!(b.unwrap(), vec![10, 20, 30]);
        assert_eq!(mock.request_count(), 4);
    }

    #[tokio::test]
    async fn test_stream_can_move_into_task() {
        let mock = MockTransport::new();
        three_pages(&mock);
        let client = client(&mock);

        let items = client.get_and_flatten_all_pages::<u32>(issues_request());
        let handle = tokio::spawn(async move { items.collect_all().await });

        assert_eq!(handle.await.unwrap().unwrap().len(), 7);
    }
}
