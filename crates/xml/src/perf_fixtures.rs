pub const BLOCK_TEMPLATE: &str = concat!(
    "<item id=\"42\" kind='block'>",
    "<title>hello &amp; goodbye</title>",
    "<!-- note -->",
    "<body><![CDATA[raw <data>]]></body>",
    "<empty/>",
    "</item>\n",
);

/// A single-rooted document of `blocks` repeated items.
pub fn make_blocks(blocks: usize) -> String {
    let mut xml = String::with_capacity(BLOCK_TEMPLATE.len() * blocks + 32);
    xml.push_str("<?xml version=\"1.0\"?>\n<feed>\n");
    for _ in 0..blocks {
        xml.push_str(BLOCK_TEMPLATE);
    }
    xml.push_str("</feed>\n");
    xml
}

/// A document nested `depth` elements deep.
pub fn make_nested(depth: usize) -> String {
    let mut xml = String::with_capacity(depth * 7);
    for _ in 0..depth {
        xml.push_str("<n>");
    }
    for _ in 0..depth {
        xml.push_str("</n>");
    }
    xml
}
