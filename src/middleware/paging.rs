use std::convert::Infallible;

use rocket::request::{FromRequest, Outcome, Request};

use crate::data::store::Page;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// `?page=<n>&size=<n>` window. Listings are unpaged unless either is given.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct PageState(pub Option<Page>);

impl PageState {
    pub fn new(page: Option<u32>, size: Option<u32>) -> PageState {
        if page.is_none() && size.is_none() {
            return PageState(None);
        }

        let size = size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
        let page = page.unwrap_or(0);

        PageState(Some(Page {
            skip: page as u64 * size as u64,
            limit: size as i64,
        }))
    }

    pub fn page(self) -> Option<Page> {
        self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PageState {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let size: Option<u32> = request.query_value("size").and_then(|it| it.ok());
        let page: Option<u32> = request.query_value("page").and_then(|it| it.ok());

        Outcome::Success(PageState::new(page, size))
    }
}
