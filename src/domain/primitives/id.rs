use crate::uuid_wrapper;

uuid_wrapper!(NoticeId);
uuid_wrapper!(UserId);

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use uuid::Uuid;
    use super::NoticeId;

    #[test]
    fn id_converts_to_uuid_and_back() {
        let uuid = Uuid::new_v4();
        let id = NoticeId::new(uuid);
        assert_eq!(Uuid::from(id), uuid);
        assert_eq!(NoticeId::from_str(&uuid.to_string()).unwrap(), id);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{uuid}\""));
    }
}
