fn main() {
  ord_ledger::main()
}
