//! Maps the placeholder API's foreign record shapes onto dashboard records.
//!
//! Records that do not deserialize are skipped with a warning rather than
//! failing the whole fetch.

use rand::Rng;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use shared::domain::{ActivityStatus, Product, RecordId, User, UserRole, PRODUCT_CATEGORIES};
use tracing::warn;

#[derive(Debug, Deserialize)]
struct PlaceholderUser {
    id: u64,
    name: String,
    #[serde(default)]
    username: String,
    email: String,
    #[serde(default)]
    phone: String,
    #[serde(default)]
    website: String,
    #[serde(default)]
    company: Option<PlaceholderCompany>,
    #[serde(default)]
    address: Option<PlaceholderAddress>,
}

#[derive(Debug, Deserialize)]
struct PlaceholderCompany {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlaceholderAddress {
    #[serde(default)]
    street: String,
    #[serde(default)]
    city: String,
}

#[derive(Debug, Deserialize)]
struct PlaceholderPost {
    id: u64,
    title: String,
    #[serde(default)]
    body: String,
}

pub fn users_from_placeholder(values: Vec<Value>) -> Vec<User> {
    decode_each::<PlaceholderUser>(values, "user")
        .map(|user| User {
            id: RecordId::from(user.id),
            role: if user.id == 1 {
                UserRole::Admin
            } else {
                UserRole::User
            },
            status: ActivityStatus::Active,
            avatar: format!("https://i.pravatar.cc/150?img={}", user.id),
            address: user
                .address
                .map(|a| format!("{}, {}", a.street, a.city))
                .unwrap_or_default(),
            company: user.company.map(|c| c.name).unwrap_or_default(),
            name: user.name,
            username: user.username,
            email: user.email,
            phone: user.phone,
            website: user.website,
        })
        .collect()
}

pub fn products_from_posts(values: Vec<Value>) -> Vec<Product> {
    let mut rng = rand::rng();
    decode_each::<PlaceholderPost>(values, "post")
        .map(|post| {
            let price: f64 = rng.random_range(10.0..110.0);
            Product {
                id: RecordId::from(post.id),
                name: format!("Product {}", post.id),
                description: post.title,
                long_description: post.body,
                price: (price * 100.0).round() / 100.0,
                category: category_for(post.id).to_string(),
                stock: rng.random_range(0..100),
                image: format!("https://picsum.photos/seed/{}/400/300", post.id),
                status: ActivityStatus::Active,
            }
        })
        .collect()
}

fn category_for(id: u64) -> &'static str {
    PRODUCT_CATEGORIES[(id % PRODUCT_CATEGORIES.len() as u64) as usize]
}

fn decode_each<T: DeserializeOwned>(
    values: Vec<Value>,
    kind: &'static str,
) -> impl Iterator<Item = T> {
    values
        .into_iter()
        .filter_map(move |value| match serde_json::from_value::<T>(value) {
            Ok(decoded) => Some(decoded),
            Err(error) => {
                warn!(kind, %error, "skipping malformed remote record");
                None
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_nested_user_fields() {
        let users = users_from_placeholder(vec![json!({
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "phone": "1-770-736-8031",
            "website": "hildegard.org",
            "company": {"name": "Romaguera-Crona"},
            "address": {"street": "Kulas Light", "city": "Gwenborough"}
        })]);

        assert_eq!(users.len(), 1);
        let user = &users[0];
        assert_eq!(user.id, RecordId::from("1"));
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.company, "Romaguera-Crona");
        assert_eq!(user.address, "Kulas Light, Gwenborough");
        assert_eq!(user.avatar, "https://i.pravatar.cc/150?img=1");
    }

    #[test]
    fn non_first_users_are_plain_users() {
        let users = users_from_placeholder(vec![json!({
            "id": 2, "name": "Ervin Howell", "email": "Shanna@melissa.tv"
        })]);
        assert_eq!(users[0].role, UserRole::User);
        assert_eq!(users[0].address, "");
    }

    #[test]
    fn skips_malformed_records() {
        let products = products_from_posts(vec![
            json!({"id": 5, "title": "sunt aut facere", "body": "quia et suscipit"}),
            json!({"title": "missing id"}),
            json!("not an object"),
        ]);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Product 5");
    }

    #[test]
    fn post_mapping_derives_category_and_bounds_values() {
        let products = products_from_posts(
            (1..=10)
                .map(|id| json!({"id": id, "title": format!("title {id}")}))
                .collect(),
        );
        for product in &products {
            let id = product.id.as_number().expect("numeric id");
            assert_eq!(product.category, category_for(id));
            assert!((10.0..=110.0).contains(&product.price));
            assert!((0..100).contains(&product.stock));
        }
        assert_eq!(products[0].category, "Clothing");
        assert_eq!(products[4].category, "Electronics");
    }
}
