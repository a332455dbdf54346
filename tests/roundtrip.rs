use revive_iptv_lib::playlist::{parse, serialize, M3U_HEADER};

#[test]
fn parse_then_serialize_is_identity_modulo_header() {
    let body = "#EXTINF:-1 tvg-id=\"a.b\" tvg-logo=\"http://logo/x.png\" group-title=\"News\",Channel A\nhttp://host.example/a.ts\n#EXTINF:-1,Plain\nhttp://host.example/plain.m3u8";
    let input = format!("{}\n{}", M3U_HEADER, body);
    assert_eq!(serialize(&parse(&input)), input);
}

#[test]
fn serialize_of_parse_is_a_fixed_point() {
    // Messy input: headerless, blank lines, an orphan descriptor.
    let input = "#EXTINF:-1,Kept\n\nhttp://host.example/kept.ts\n#EXTINF:-1,Orphaned without url\n#EXTINF:-1,Second\nhttp://host.example/second.ts\n";
    let once = serialize(&parse(input));
    let twice = serialize(&parse(&once));
    assert_eq!(once, twice);
    assert!(once.starts_with(M3U_HEADER));
    assert!(!once.contains("Orphaned"));
}

#[test]
fn duplicate_entries_survive_as_distinct_pairs() {
    let input = "#EXTINF:-1 group-title=\"Music\",Hits\nhttp://host.example/hits.ts\n#EXTINF:-1 group-title=\"Music\",Hits\nhttp://host.example/hits.ts\n";
    let entries = parse(input);
    assert_eq!(entries.len(), 2);
    let out = serialize(&entries);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], lines[3]);
    assert_eq!(lines[2], lines[4]);
}

#[test]
fn non_http_lines_after_descriptor_drop_the_block() {
    let input = "#EXTINF:-1,Bad\nrtsp://host.example/stream\n#EXTINF:-1,Good\nhttp://host.example/good.ts\n";
    let entries = parse(input);
    // Only the http-backed block parses; the other is silently skipped.
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "Good");
}
