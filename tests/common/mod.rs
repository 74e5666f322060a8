//! Test utilities and helper functions for the svg_inliner test suite

use mockito::{Mock, Server, ServerGuard};

/// Creates a test HTML document with the given body content
#[allow(dead_code)]
pub fn create_test_html(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Test</title>
</head>
<body>
    {body}
</body>
</html>"#
    )
}

/// Sets up a mock HTTP server with predefined responses
#[allow(dead_code)]
pub async fn setup_mock_server() -> ServerGuard {
    Server::new_async().await
}

/// Creates a mock endpoint that returns SVG content
#[allow(dead_code)]
pub async fn create_svg_mock(server: &mut Server, path: &str, svg: &str) -> Mock {
    server
        .mock("GET", path)
        .with_status(200)
        .with_header("content-type", "image/svg+xml")
        .with_body(svg)
        .create_async()
        .await
}

/// Creates a mock endpoint that returns an error
#[allow(dead_code)]
pub async fn create_error_mock(server: &mut Server, path: &str, status: usize) -> Mock {
    server
        .mock("GET", path)
        .with_status(status)
        .with_body("Error")
        .create_async()
        .await
}

/// Pulls the first value of an attribute out of serialized HTML
#[allow(dead_code)]
pub fn attr_value<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let start = html.find(&needle)? + needle.len();
    let end = html[start..].find('"')? + start;
    Some(&html[start..end])
}
