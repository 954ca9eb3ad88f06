use crate::domain::UserId;

// ============== Authorization ==============

/// Owner-only commands (`eval`, error reports) are gated on this.
pub fn is_owner(user_id: Option<UserId>, owner_id: i64) -> bool {
    let Some(user_id) = user_id else {
        return false;
    };
    user_id.0 == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_owner_passes() {
        assert!(is_owner(Some(UserId(42)), 42));
        assert!(!is_owner(Some(UserId(7)), 42));
        assert!(!is_owner(None, 42));
    }
}
