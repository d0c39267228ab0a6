mod favorite_test;
mod helpers;
mod recipe_test;
mod router_test;
mod shopping_cart_test;
