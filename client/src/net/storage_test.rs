use super::*;

#[cfg(not(feature = "hydrate"))]
#[test]
fn server_side_store_is_empty() {
    assert_eq!(BrowserTokenStore.get(), None);
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn server_side_store_refuses_writes() {
    assert!(matches!(BrowserTokenStore.set("tok1"), Err(StoreError::Unavailable(_))));
    assert_eq!(BrowserTokenStore.get(), None);
}

#[cfg(not(feature = "hydrate"))]
#[test]
fn server_side_clear_succeeds() {
    assert_eq!(BrowserTokenStore.clear(), Ok(()));
}
