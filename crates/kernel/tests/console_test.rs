use kernel::{BufferConsole, Console};

#[test]
fn buffer_console_collects_text_and_keys() {
    let mut console = BufferConsole::new();
    console.put_text("5");
    console.put_line(" done");
    console.key_pressed('q');

    assert_eq!(console.output(), "5 done\n");
    assert_eq!(console.keys(), &['q']);
    assert_eq!(console.take_output(), "5 done\n");
    assert_eq!(console.output(), "");
}
