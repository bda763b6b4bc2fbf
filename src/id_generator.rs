use uuid::Uuid;

/// Generate a collision-resistant document id (random UUID v4)
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}
