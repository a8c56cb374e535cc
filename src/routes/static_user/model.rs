use crate::user::User;

const STATIC_USERS: [(i32, &str, i32); 5] = [
    (1, "mark", 25),
    (2, "kofi", 30),
    (3, "ama", 22),
    (4, "kwame", 28),
    (5, "esi", 26),
];

pub fn static_users() -> Vec<User> {
    STATIC_USERS
        .iter()
        .map(|&(id, name, age)| User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name),
            age: Some(age),
        })
        .collect()
}
