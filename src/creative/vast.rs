const BUILT_IN_EVENTS: &[&str] = &[
    "start",
    "firstQuartile",
    "midpoint",
    "thirdQuartile",
    "complete",
    "pause",
    "resume",
    "skip",
];

/// Builds a VAST 3.0 inline document around a single progressive MP4.
///
/// Built-in tracking events come first, then one `progress` event per
/// non-blank tracking tag in the order given. Output is fully determined by
/// the arguments.
pub fn generate_vast_wrapper(content_url: &str, tracking_tags: &[String]) -> String {
    let built_in = BUILT_IN_EVENTS
        .iter()
        .map(|event| {
            format!(
                "    <Tracking event=\"{event}\"><![CDATA[https://track.example.com/{event}]]></Tracking>",
                event = event
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let third_party = tracking_tags
        .iter()
        .filter(|tag| !tag.trim().is_empty())
        .map(|tag| format!("    <Tracking event=\"progress\"><![CDATA[{}]]></Tracking>", tag))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<VAST version="3.0">
  <Ad id="generated">
    <InLine>
      <Impression><![CDATA[https://impression.example.com]]></Impression>
      <Creatives>
        <Creative>
          <Linear>
            <Duration>00:00:15</Duration>
            <MediaFiles>
              <MediaFile delivery="progressive" type="video/mp4" width="1920" height="1080"><![CDATA[{content_url}]]></MediaFile>
            </MediaFiles>
            <VideoClicks>
              <ClickThrough><![CDATA[https://click.example.com]]></ClickThrough>
            </VideoClicks>
            <TrackingEvents>
{built_in}
{third_party}
            </TrackingEvents>
          </Linear>
        </Creative>
      </Creatives>
    </InLine>
  </Ad>
</VAST>"#,
        content_url = content_url,
        built_in = built_in,
        third_party = third_party,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapper_embeds_content_url() {
        let xml = generate_vast_wrapper("https://cdn.example.com/ads/1/content", &[]);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<VAST version=\"3.0\">"));
        assert!(xml.contains("<![CDATA[https://cdn.example.com/ads/1/content]]></MediaFile>"));
        assert!(xml.contains("<Duration>00:00:15</Duration>"));
        assert!(xml.ends_with("</VAST>"));
    }

    #[test]
    fn built_in_events_precede_progress_tags() {
        let tags = vec![
            "https://a.example.com/p".to_owned(),
            "  ".to_owned(),
            "https://b.example.com/p".to_owned(),
        ];

        let xml = generate_vast_wrapper("u", &tags);

        let skip = xml.find("track.example.com/skip").unwrap();
        let first = xml.find("a.example.com").unwrap();
        let second = xml.find("b.example.com").unwrap();
        assert!(skip < first && first < second);
        assert_eq!(xml.matches("event=\"progress\"").count(), 2);
        assert_eq!(xml.matches("<Tracking ").count(), 10);
    }

    #[test]
    fn wrapper_is_deterministic() {
        let tags = vec!["https://a.example.com/p".to_owned()];

        assert_eq!(
            generate_vast_wrapper("u", &tags),
            generate_vast_wrapper("u", &tags)
        );
    }
}
