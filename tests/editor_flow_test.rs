//! End-to-end tests driving the field editor against a running server

mod common;

use common::{first_page_operations, operands, sample_pdf, TestServer};
use pdf_sign_server::{Error, FieldEditor, FieldType, Point, RadioChoice, SignClient, Size};
use std::time::Duration;

#[tokio::test]
async fn test_editor_placement_round_trips_to_pdf_coordinates() {
    let server = TestServer::start().await;
    server.put_original("sample.pdf", &sample_pdf(600, 800));

    let mut editor = FieldEditor::new();
    editor.set_container_size(Size::new(600.0, 800.0));

    let name = editor.add_field(FieldType::Text).id.clone();
    editor.begin_drag(&name, Point::new(110.0, 110.0)).unwrap();
    editor.pointer_move(Point::new(70.0, 90.0));
    editor.pointer_up();
    editor.set_text(&name, "Jane Doe").unwrap();

    let consent = editor.add_field(FieldType::Radio).id.clone();
    editor.choose_radio(&consent, RadioChoice::Yes).unwrap();

    let response = editor.submit(&server.client, "sample.pdf").await.unwrap();
    assert!(response.signed_pdf_url.ends_with("signed-sample.pdf"));

    let ops = first_page_operations(&server.download(&response.signed_pdf_url).await);
    let positions: Vec<Vec<f64>> = ops
        .iter()
        .filter(|op| op.operator == "Td")
        .map(operands)
        .collect();

    // Original text run, then one run per stamped field
    assert_eq!(positions.len(), 3);
    // Dragged to (60, 80): 800 - 80 - 40 + 20 - 6
    assert!((positions[1][0] - 64.0).abs() < 1e-3);
    assert!((positions[1][1] - 694.0).abs() < 1e-3);
    // Radio added second at (120, 120)
    assert!((positions[2][0] - 124.0).abs() < 1e-3);
    assert!((positions[2][1] - 654.0).abs() < 1e-3);

    assert_eq!(server.audit.len(), 1);
}

#[tokio::test]
async fn test_editor_signature_reaches_document() {
    let server = TestServer::start().await;
    server.put_original("sample.pdf", &sample_pdf(600, 800));

    let mut editor = FieldEditor::new();
    // Rendered at half scale; ratios make the size irrelevant
    editor.set_container_size(Size::new(300.0, 400.0));

    let signature = editor.add_field(FieldType::Signature).id.clone();
    let mut pad = editor.signature_pad(&signature).unwrap();
    pad.begin_stroke(Point::new(10.0, 30.0));
    pad.extend_stroke(Point::new(80.0, 10.0));
    pad.extend_stroke(Point::new(150.0, 30.0));
    let drawing = pad.end_stroke().unwrap().unwrap();
    editor.set_signature(&signature, drawing).unwrap();

    let response = editor.submit(&server.client, "sample.pdf").await.unwrap();
    let ops = first_page_operations(&server.download(&response.signed_pdf_url).await);

    let cm = ops.iter().find(|op| op.operator == "cm").unwrap();
    let m = operands(cm);
    // 160x40 px at (100, 100) of 300x400 is a 320x80 pt box at (200, 520);
    // the 160x40 drawing scales by 2 and fills it
    assert!((m[0] - 320.0).abs() < 1e-3);
    assert!((m[3] - 80.0).abs() < 1e-3);
    assert!((m[4] - 200.0).abs() < 1e-3);
    assert!((m[5] - 520.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_empty_editor_sends_nothing() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let client = SignClient::new(&format!("http://{}", listener.local_addr().unwrap())).unwrap();

    let mut editor = FieldEditor::new();
    editor.set_container_size(Size::new(600.0, 800.0));

    let err = editor.submit(&client, "sample.pdf").await.unwrap_err();
    assert!(matches!(err, Error::NoFields));
    assert_eq!(err.to_string(), "Place and resize fields before signing.");

    let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
    assert!(accepted.is_err(), "no connection should have been made");
}

#[tokio::test]
async fn test_unmeasured_editor_sends_nothing() {
    let server = TestServer::start().await;
    server.put_original("sample.pdf", &sample_pdf(600, 800));

    let mut editor = FieldEditor::new();
    editor.add_field(FieldType::Text);

    let err = editor.submit(&server.client, "sample.pdf").await.unwrap_err();
    assert!(matches!(err, Error::ContainerNotMeasured));
    assert!(server.audit.is_empty());
    assert!(!server.signed_path("sample.pdf").exists());
}
