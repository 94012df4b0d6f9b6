// Shared across test binaries; not every binary uses every helper.
#![allow(dead_code)]

use civiclink::{Draft, NewComplaint, Priority};

/// A fully valid create payload.
pub fn payload(title: &str) -> NewComplaint {
    NewComplaint {
        title: title.to_string(),
        description: format!("Details about: {title}"),
        category_id: "cat-infra".to_string(),
        sub_category_id: Some("sub-lighting".to_string()),
        priority: Priority::Medium,
        address: "12 Elm Street".to_string(),
        landmark: None,
        location: None,
        images: vec![],
        is_anonymous: false,
    }
}

/// A draft that passes submission validation.
pub fn draft_with(title: &str) -> Draft {
    Draft {
        title: Some(title.to_string()),
        description: Some(format!("Details about: {title}")),
        category_id: Some("cat-infra".to_string()),
        sub_category_id: Some("sub-lighting".to_string()),
        address: Some("12 Elm Street".to_string()),
        ..Default::default()
    }
}
