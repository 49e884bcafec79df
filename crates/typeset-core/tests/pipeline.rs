use typeset_core::{process, AutolinkOptions, LinkOptions};

#[test]
fn no_services_returns_the_input_untouched() {
    let html = "<p>&copy; \"as is\"</p><div>";
    let (out, stats) = process(html).apply_with_stats().unwrap();
    assert_eq!(out, html);
    assert_eq!((stats.parses, stats.serializations, stats.services_run), (0, 0, 0));
}

#[test]
fn parses_and_serializes_once_for_all_document_services() {
    let (out, stats) = process("<p>\"Hallo\" sagt example.com zu @acme und dir heute</p><p></p>")
        .autolink(AutolinkOptions::default())
        .typography("de", |t| {
            t.localize_quotes().wrap_quotes().prevent_widows();
        })
        .unwrap()
        .autolink_prefix("@", "https://example.social/@")
        .unwrap()
        .remove_empty_elements(None)
        .unwrap()
        .process_links(LinkOptions::default())
        .apply_with_stats()
        .unwrap();
    assert_eq!(stats.parses, 1);
    assert_eq!(stats.serializations, 1);
    assert_eq!(stats.services_run, 7);
    assert!(out.starts_with("<p><q>Hallo</q> sagt <a "));
    assert!(out.contains(">example.com</a>"));
    assert!(out.contains(">@acme</a>"));
    assert!(out.ends_with("dir&nbsp;heute</p>"));
}

#[test]
fn entities_survive_the_pipeline() {
    let out = process("<p title=\"a &amp; b\">Fish &amp; Chips &lt;3 &#169; &hellip; are not a widow</p>")
        .typography("en", |t| {
            t.prevent_widows();
        })
        .unwrap()
        .apply()
        .unwrap();
    assert_eq!(
        out,
        "<p title=\"a &amp; b\">Fish &amp; Chips &lt;3 © … are not a&nbsp;widow</p>"
    );
}

fn remove_empty(html: &str, selector: Option<&str>) -> String {
    process(html)
        .remove_empty_elements(selector)
        .unwrap()
        .apply()
        .unwrap()
}

#[test]
fn removes_empty_elements() {
    for html in ["<p></p>", "<p>\u{a0}</p>", "<p> &nbsp; </p>"] {
        assert_eq!(remove_empty(html, None), "");
    }
    assert_eq!(remove_empty("<div>\u{a0}</div>", Some("p,div")), "");
    assert_eq!(
        remove_empty("<p><!-- preserve me --></p>", None),
        "<p><!-- preserve me --></p>"
    );
    assert_eq!(remove_empty("<p><span></span></p>", None), "<p><span></span></p>");
}

#[test]
fn encodes_emails() {
    let out = process(r#"<a href="mailto:mail@example.com">mail@example.com</a>"#)
        .encode_emails()
        .apply()
        .unwrap();
    assert!(out.starts_with("<a href=\""));
    assert!(out.ends_with("</a>"));
    assert!(out.matches('#').count() > 10);
}

#[test]
fn encoded_emails_survive_document_services() {
    let (out, stats) = process("<p>Write to mail@example.com today or tomorrow</p>")
        .encode_emails()
        .typography("en", |t| {
            t.prevent_widows();
        })
        .unwrap()
        .apply_with_stats()
        .unwrap();
    assert_eq!((stats.parses, stats.serializations), (1, 1));
    assert!(!out.contains("mail@example.com"));
    assert!(out.contains("&#"));
    assert!(out.ends_with("today or&nbsp;tomorrow</p>"));
}
