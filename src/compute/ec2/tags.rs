use crate::compute::ec2::document::Element;
use crate::compute::Params;
use std::collections::BTreeMap;

pub trait TagFinder<'a> {
    fn find_tag(self, key: &str) -> Option<&'a str>;
}

impl<'a, T> TagFinder<'a> for T
where
    T: IntoIterator<Item = &'a Element>,
{
    fn find_tag(self, key: &str) -> Option<&'a str> {
        self.into_iter()
            .filter_map(|item| match (item.find_text("key"), item.find_text("value")) {
                (Some(k), Some(v)) if k == key => Some(v),
                _ => None,
            })
            .next()
    }
}

/// Collects a `tagSet` into a map. Tags without a value map to "".
pub fn to_tags(element: &Element) -> BTreeMap<String, String> {
    element
        .find_all("tagSet/item")
        .into_iter()
        .filter_map(|item| {
            item.find_text("key").map(|k| {
                (
                    k.to_owned(),
                    item.find_text("value").unwrap_or("").to_owned(),
                )
            })
        })
        .collect()
}

pub fn tag_params(tags: &BTreeMap<String, String>) -> Params {
    let mut params = Params::new();
    for (i, (key, value)) in tags.iter().enumerate() {
        params.insert(format!("Tag.{}.Key", i + 1), key.clone());
        params.insert(format!("Tag.{}.Value", i + 1), value.clone());
    }
    params
}
