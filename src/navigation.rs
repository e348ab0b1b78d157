//! The navigation shown on every signed-in page: a top bar on large screens
//! and a bottom bar with a "More" menu on small screens.

use maud::{Markup, html};

use crate::endpoints;

/// Where a link is shown on small screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// A button of its own in the bottom bar.
    BottomBar,
    /// An item in the "More" menu.
    More,
}

struct NavLink {
    url: &'static str,
    title: &'static str,
    slot: Slot,
}

const LINKS: [NavLink; 6] = [
    NavLink {
        url: endpoints::ROOT,
        title: "Home",
        slot: Slot::BottomBar,
    },
    NavLink {
        url: endpoints::TRANSACTION_HISTORY_VIEW,
        title: "Transaction History",
        slot: Slot::BottomBar,
    },
    NavLink {
        url: endpoints::MY_BANKS_VIEW,
        title: "My Banks",
        slot: Slot::BottomBar,
    },
    NavLink {
        url: endpoints::PAYMENT_TRANSFER_VIEW,
        title: "Payment Transfer",
        slot: Slot::More,
    },
    NavLink {
        url: endpoints::LINK_BANK_VIEW,
        title: "Link Bank",
        slot: Slot::More,
    },
    NavLink {
        url: endpoints::SIGN_OUT,
        title: "Sign out",
        slot: Slot::More,
    },
];

const TOP_LINK_STYLE: &str = "block py-2 px-3 text-gray-900 rounded-sm hover:bg-gray-100 \
    lg:hover:bg-transparent lg:hover:text-blue-700 lg:p-0 dark:text-white \
    lg:dark:hover:text-blue-500 dark:hover:bg-gray-700";
const TOP_LINK_CURRENT_STYLE: &str = "block py-2 px-3 text-white bg-blue-700 rounded-sm \
    lg:bg-transparent lg:text-blue-700 lg:p-0 dark:text-white lg:dark:text-blue-500";

const BOTTOM_BUTTON_STYLE: &str = "flex w-full min-w-0 items-center justify-center rounded-lg \
    px-2.5 py-2 text-xs font-semibold leading-tight text-gray-600 sm:px-4 sm:text-sm \
    cursor-pointer hover:bg-blue-50/70 hover:text-blue-700 dark:text-gray-300 \
    dark:hover:bg-blue-900/20 dark:hover:text-blue-200";
const BOTTOM_BUTTON_CURRENT_STYLE: &str = "flex w-full min-w-0 items-center justify-center \
    rounded-lg bg-blue-50 px-2.5 py-2 text-xs font-semibold leading-tight text-blue-700 \
    shadow-sm sm:px-4 sm:text-sm cursor-pointer dark:bg-blue-900/30 dark:text-blue-200";

const MENU_ITEM_STYLE: &str = "block rounded-lg px-3 py-2 text-gray-700 hover:bg-gray-100 \
    hover:text-blue-700 dark:text-gray-200 dark:hover:bg-gray-800/80 dark:hover:text-blue-200";
const MENU_ITEM_CURRENT_STYLE: &str = "block rounded-lg bg-blue-50 px-3 py-2 text-blue-700 \
    dark:bg-blue-900/30 dark:text-blue-200";

fn pick(is_current: bool, current_style: &'static str, style: &'static str) -> &'static str {
    if is_current { current_style } else { style }
}

/// The navigation for the page at `active_endpoint`.
pub struct NavBar<'a> {
    active_endpoint: &'a str,
}

impl<'a> NavBar<'a> {
    /// Get the navigation bar.
    ///
    /// The link to `active_endpoint`, if there is one, is highlighted and
    /// marked with `aria-current="page"`. Signing out is never highlighted.
    pub fn new(active_endpoint: &'a str) -> Self {
        Self { active_endpoint }
    }

    fn is_current(&self, link: &NavLink) -> bool {
        link.url != endpoints::SIGN_OUT && link.url == self.active_endpoint
    }

    pub fn into_html(self) -> Markup {
        let more_is_current = LINKS
            .iter()
            .any(|link| link.slot == Slot::More && self.is_current(link));

        html!(
            nav class="bg-white border-gray-200 dark:bg-gray-900"
            {
                div class="max-w-screen-xl flex flex-wrap items-center justify-between mx-auto p-4"
                {
                    a href=(endpoints::ROOT) class="flex items-center gap-2"
                    {
                        img src="/static/logo.svg" alt="Horizon logo" class="h-8";
                        span class="self-center text-2xl font-semibold whitespace-nowrap dark:text-white"
                        {
                            "Horizon"
                        }
                    }

                    ul
                        class="hidden lg:flex font-medium lg:flex-row lg:space-x-8"
                        aria-label="Main"
                    {
                        @for link in &LINKS {
                            @let is_current = self.is_current(link);
                            li {
                                a
                                    href=(link.url)
                                    class=(pick(is_current, TOP_LINK_CURRENT_STYLE, TOP_LINK_STYLE))
                                    aria-current=[is_current.then_some("page")]
                                {
                                    (link.title)
                                }
                            }
                        }
                    }
                }
            }

            nav class="fixed inset-x-0 bottom-0 z-40 lg:hidden"
            {
                ul
                    class="mx-auto mb-4 grid max-w-screen-xl grid-cols-4 gap-2 rounded-xl border
                    border-gray-200 bg-white/95 px-4 py-3 shadow-lg backdrop-blur
                    dark:border-gray-700 dark:bg-gray-900/95"
                    aria-label="Mobile"
                {
                    @for link in LINKS.iter().filter(|link| link.slot == Slot::BottomBar) {
                        @let is_current = self.is_current(link);
                        li class="min-w-0" {
                            a
                                href=(link.url)
                                class=(pick(is_current, BOTTOM_BUTTON_CURRENT_STYLE, BOTTOM_BUTTON_STYLE))
                                aria-current=[is_current.then_some("page")]
                            {
                                span class="truncate" { (link.title) }
                            }
                        }
                    }

                    li class="min-w-0" {
                        details class="relative"
                        {
                            summary
                                class={
                                    "list-none [&::-webkit-details-marker]:hidden "
                                    (pick(more_is_current, BOTTOM_BUTTON_CURRENT_STYLE, BOTTOM_BUTTON_STYLE))
                                }
                            {
                                span class="truncate" { "More" }
                            }

                            ul
                                class="absolute bottom-full right-0 mb-3 flex w-44 flex-col gap-1
                                rounded-xl border border-gray-200 bg-white/95 p-2 text-sm font-medium
                                shadow-xl dark:border-gray-700 dark:bg-gray-900/95"
                            {
                                @for link in LINKS.iter().filter(|link| link.slot == Slot::More) {
                                    @let is_current = self.is_current(link);
                                    li {
                                        a
                                            href=(link.url)
                                            class=(pick(is_current, MENU_ITEM_CURRENT_STYLE, MENU_ITEM_STYLE))
                                            aria-current=[is_current.then_some("page")]
                                        {
                                            (link.title)
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::NavBar;

    fn current_links(active_endpoint: &str) -> Vec<String> {
        let html = Html::parse_fragment(&NavBar::new(active_endpoint).into_html().into_string());
        let selector = Selector::parse("a[aria-current=page]").unwrap();

        html.select(&selector)
            .filter_map(|link| link.value().attr("href"))
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn highlights_page_in_top_and_bottom_bars() {
        for endpoint in [
            endpoints::ROOT,
            endpoints::TRANSACTION_HISTORY_VIEW,
            endpoints::MY_BANKS_VIEW,
            endpoints::PAYMENT_TRANSFER_VIEW,
            endpoints::LINK_BANK_VIEW,
        ] {
            assert_eq!(
                current_links(endpoint),
                vec![endpoint.to_owned(), endpoint.to_owned()],
                "wrong links highlighted on {endpoint}"
            );
        }
    }

    #[test]
    fn pages_outside_the_menu_highlight_nothing() {
        for endpoint in [
            endpoints::SIGN_IN_VIEW,
            endpoints::SIGN_UP_VIEW,
            endpoints::SIGN_OUT,
            endpoints::INTERNAL_ERROR_VIEW,
            endpoints::TRANSFERS_API,
        ] {
            assert!(
                current_links(endpoint).is_empty(),
                "a link was highlighted on {endpoint}"
            );
        }
    }

    #[test]
    fn more_menu_is_highlighted_only_for_its_pages() {
        let summary_class = |endpoint: &str| {
            let html = Html::parse_fragment(&NavBar::new(endpoint).into_html().into_string());
            let summary = Selector::parse("summary").unwrap();

            html.select(&summary)
                .next()
                .and_then(|summary| summary.value().attr("class"))
                .unwrap()
                .to_owned()
        };

        assert!(summary_class(endpoints::PAYMENT_TRANSFER_VIEW).contains("shadow-sm"));
        assert!(summary_class(endpoints::LINK_BANK_VIEW).contains("shadow-sm"));
        assert!(!summary_class(endpoints::ROOT).contains("shadow-sm"));
    }
}
