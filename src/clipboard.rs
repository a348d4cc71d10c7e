use anyhow::Result;

#[cfg(feature = "clipboard")]
pub fn copy(text: &str) -> Result<()> {
    use anyhow::Context;

    let mut cb = arboard::Clipboard::new().context("open system clipboard")?;
    cb.set_text(text).context("write system clipboard")?;
    Ok(())
}

#[cfg(not(feature = "clipboard"))]
pub fn copy(_text: &str) -> Result<()> {
    anyhow::bail!("built without the `clipboard` feature")
}
