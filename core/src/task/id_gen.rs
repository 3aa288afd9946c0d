use chrono::Utc;
use uuid::Uuid;

use super::types::TaskId;

const SUFFIX_LEN: usize = 12;

/// `task-{epoch_millis}-{12 hex}`; the server only treats it as an opaque key.
pub fn generate_task_id() -> TaskId {
    let millis = Utc::now().timestamp_millis();
    let random = Uuid::new_v4().simple().to_string();
    TaskId::new(format!("task-{millis}-{}", &random[..SUFFIX_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use std::collections::HashSet;

    #[test]
    fn id_has_millis_and_hex_suffix() {
        let id = generate_task_id();
        let re = Regex::new(r"^task-\d{13,}-[a-f0-9]{12}$").unwrap();
        assert!(re.is_match(id.as_str()), "generated id: {id}");
    }

    #[test]
    fn ids_do_not_repeat_within_a_millisecond() {
        let ids: HashSet<_> = (0..5000).map(|_| generate_task_id()).collect();
        assert_eq!(ids.len(), 5000);
    }
}
