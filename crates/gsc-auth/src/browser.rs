/// Opens the consent page. Failures are reported but never abort a login.
pub trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> anyhow::Result<()>;
}

/// Prints the URL, then hands it to the OS default browser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> anyhow::Result<()> {
        eprintln!("{}", launch_notice(url));
        open::that(url).map_err(|err| anyhow::anyhow!("could not open browser: {err}"))
    }
}

fn launch_notice(url: &str) -> String {
    format!(
        "Opening browser for authorization...\nIf the browser doesn't open, visit this URL:\n{url}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_notice_announces_once_and_shows_url() {
        let notice = launch_notice("https://accounts.example.com/auth?state=st");
        assert_eq!(notice.matches("Opening browser").count(), 1);
        assert!(notice.contains("https://accounts.example.com/auth?state=st"));
    }
}
