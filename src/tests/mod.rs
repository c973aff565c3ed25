mod coupons;
mod elements;
mod invalid_json;
mod relationships;
mod scrapbooks;
mod users;
