fn main() {
    let args = arguable::parse_or_exit("-e[emoji] name greetings...?");
    let bang = if args.flag("emoji") { "❣️" } else { "!" };
    let name = args.string("name").unwrap_or("world");
    println!("Hello {}{}", name, bang);
    if let Some(greetings) = args.list("greetings") {
        for greeting in greetings {
            if let Some(text) = greeting.as_str() {
                println!("{} {}{}", text, name, bang);
            }
        }
    }
}
