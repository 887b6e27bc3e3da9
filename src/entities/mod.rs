pub mod about_content;
pub mod cart;
pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;
pub mod product_image;
pub mod tour_registration;
pub mod tour_slot_occupancy;
